//! Side by side comparison of several switch configurations.
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::net::Ipv4Addr;

use tabled::builder::Builder;
use tabled::settings::Style;

use crate::model::{Configuration, Interface, MacAddr, VlanId};
use crate::token::*;

/// A setting as shown in a report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Boolean(bool),
    TriState(TriState),
    Enum(&'static str),
    Text(String),
    Collection(Vec<String>),
    Missing,
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Boolean(b) => TriState::from(*b).fmt(f),
            Value::TriState(t) => t.fmt(f),
            Value::Enum(s) => f.write_str(s),
            Value::Text(s) => f.write_str(s),
            Value::Collection(v) if v.is_empty() => Value::Missing.fmt(f),
            Value::Collection(v) => f.write_str(&v.join(", ")),
            Value::Missing => f.write_str("-"),
        }
    }
}

pub trait ToValue {
    fn to_value(&self) -> Value;
}

macro_rules! text_value {
    ($($rtype:ty),*) => {
        $(
            impl ToValue for $rtype {
                fn to_value(&self) -> Value {
                    Value::Text(self.to_string())
                }
            }
        )*
    };
}
text_value!(u8, u16, u32, String, Ipv4Addr, MacAddr);

macro_rules! enum_value {
    ($($rtype:ty),*) => {
        $(
            impl ToValue for $rtype {
                fn to_value(&self) -> Value {
                    Value::Enum(self.description())
                }
            }
        )*
    };
}
enum_value!(ClockSource, SntpClientMode, SpanningTreeVersion, AddressingProtocol, AcceptFrame);

impl ToValue for bool {
    fn to_value(&self) -> Value {
        Value::Boolean(*self)
    }
}

impl ToValue for TriState {
    fn to_value(&self) -> Value {
        Value::TriState(*self)
    }
}

impl<T: ToValue> ToValue for Option<T> {
    fn to_value(&self) -> Value {
        match self {
            Some(v) => v.to_value(),
            None => Value::Missing,
        }
    }
}

impl<T: fmt::Display> ToValue for Vec<T> {
    fn to_value(&self) -> Value {
        Value::Collection(self.iter().map(|v| v.to_string()).collect())
    }
}

impl<T: fmt::Display> ToValue for BTreeSet<T> {
    fn to_value(&self) -> Value {
        Value::Collection(self.iter().map(|v| v.to_string()).collect())
    }
}

/// A named row (or column) of a report.
pub struct Property<T> {
    pub name: &'static str,
    pub get: fn(&T) -> Value,
}

impl<T> Property<T> {
    pub fn new(name: &'static str, get: fn(&T) -> Value) -> Property<T> {
        Property { name, get }
    }
}

pub struct Category<T> {
    pub name: &'static str,
    pub properties: Vec<Property<T>>,
}

impl<T> Category<T> {
    pub fn new(name: &'static str, properties: Vec<Property<T>>) -> Category<T> {
        Category { name, properties }
    }
}

/// Settings compared between switches.
pub fn overview() -> Vec<Category<Configuration>> {
    type P = Property<Configuration>;
    vec![
        Category::new(
            "General",
            vec![
                P::new("Model", |c| c.model.to_value()),
                P::new("Firmware version", |c| c.firmware_version.to_value()),
                P::new("Location", |c| c.snmp_server_location.to_value()),
            ],
        ),
        Category::new(
            "Management",
            vec![
                P::new("Management VLAN", |c| c.management.vlan.to_value()),
                P::new("IPv4 protocol", |c| c.management.ipv4.protocol.to_value()),
                P::new("IPv4 address", |c| c.management.ipv4.address.to_value()),
                P::new("IPv4 netmask", |c| c.management.ipv4.netmask.to_value()),
                P::new("IPv4 gateway", |c| c.management.ipv4.gateway.to_value()),
                P::new("IPv6 enabled", |c| c.management.ipv6_enabled.to_value()),
                P::new("HTTP session soft timeout (minutes)", |c| {
                    c.management.http_session_soft_timeout_minutes.to_value()
                }),
                P::new("HTTP session hard timeout (hours)", |c| {
                    c.management.http_session_hard_timeout_hours.to_value()
                }),
                P::new("Java interface enabled", |c| c.management.java_enabled.to_value()),
            ],
        ),
        Category::new("DNS", vec![P::new("DNS servers", |c| c.dns_servers.to_value())]),
        Category::new(
            "Time",
            vec![
                P::new("Clock source", |c| c.clock_source.to_value()),
                P::new("SNTP servers", |c| c.sntp_servers.to_value()),
                P::new("SNTP client mode", |c| c.sntp_client_mode.to_value()),
            ],
        ),
        Category::new(
            "DoS control",
            vec![
                P::new("Source MAC = destination MAC", |c| {
                    c.dos_control.smac_equals_dmac_enabled.to_value()
                }),
                P::new("Source IP = destination IP", |c| {
                    c.dos_control.sip_equals_dip_enabled.to_value()
                }),
                P::new("ICMP fragment", |c| c.dos_control.icmp_fragment_enabled.to_value()),
                P::new("IPv4 first fragment", |c| {
                    c.dos_control.ipv4_first_fragment_enabled.to_value()
                }),
                P::new("TCP fragment", |c| c.dos_control.tcp_fragment_enabled.to_value()),
                P::new("TCP flag", |c| c.dos_control.tcp_flag_enabled.to_value()),
                P::new("TCP flag / sequence", |c| {
                    c.dos_control.tcp_flag_sequence_enabled.to_value()
                }),
                P::new("TCP FIN/URG/PSH", |c| c.dos_control.tcp_fin_urg_psh_enabled.to_value()),
                P::new("TCP SYN/FIN", |c| c.dos_control.tcp_syn_fin_enabled.to_value()),
                P::new("TCP offset", |c| c.dos_control.tcp_offset_enabled.to_value()),
                P::new("L4 port", |c| c.dos_control.l4_port_enabled.to_value()),
                P::new("ICMPv4 maximum packet size", |c| {
                    let dos = &c.dos_control;
                    if dos.icmpv4_max_size_enabled {
                        dos.icmpv4_max_size.to_value()
                    } else {
                        false.to_value()
                    }
                }),
                P::new("ICMPv6 maximum packet size", |c| {
                    let dos = &c.dos_control;
                    if dos.icmpv6_max_size_enabled.is_true() {
                        dos.icmpv6_max_size.to_value()
                    } else {
                        dos.icmpv6_max_size_enabled.to_value()
                    }
                }),
            ],
        ),
        Category::new(
            "Green Ethernet",
            vec![
                P::new("Auto power down mode", |c| c.green_mode.energy_detect_enabled.to_value()),
                P::new("Short cable mode", |c| c.green_mode.short_reach_enabled.to_value()),
            ],
        ),
        Category::new(
            "Services",
            vec![P::new("DHCP filtering / snooping", |c| {
                c.ipv4_dhcp_filtering_enabled.to_value()
            })],
        ),
        Category::new(
            "Flow control",
            vec![P::new("Globally enabled", |c| c.flow_control_enabled.to_value())],
        ),
        Category::new(
            "Voice VLAN",
            vec![
                P::new("Enabled", |c| c.voice_vlan.enabled.to_value()),
                P::new("ID", |c| c.voice_vlan.id.to_value()),
            ],
        ),
        Category::new(
            "STP",
            vec![
                P::new("Enabled", |c| c.spanning_tree.enabled.to_value()),
                P::new("Operation mode", |c| c.spanning_tree.version.to_value()),
                P::new("Configuration name", |c| c.spanning_tree.name.to_value()),
                P::new("CST bridge priority", |c| c.spanning_tree.cst_bridge_priority.to_value()),
            ],
        ),
        Category::new("QoS", vec![P::new("DiffServ enabled", |c| c.diffserv_enabled.to_value())]),
    ]
}

/// Columns of the interface table.
pub fn interface_columns() -> Vec<Category<Interface>> {
    type P = Property<Interface>;
    vec![
        Category::new("Description", vec![P::new("", |i| i.description.to_value())]),
        Category::new("MTU", vec![P::new("", |i| i.mtu.to_value())]),
        Category::new("SNMP", vec![P::new("Link trap", |i| i.snmp_link_trap.to_value())]),
        Category::new(
            "Ingress",
            vec![
                P::new("Untagged VLAN", |i| i.vlan.ingress_untagged_vlan().to_value()),
                P::new("Untagged priority", |i| i.vlan.ingress_untagged_priority().to_value()),
                P::new("VLAN filter", |i| i.vlan.ingress_filter_enabled.to_value()),
                P::new("802.1p trusted", |i| i.cos_trusted.to_value()),
                P::new("DHCP trusted", |i| i.ipv4_dhcp_server_trusted.to_value()),
            ],
        ),
        Category::new("VLAN membership", vec![P::new("", |i| i.vlan.membership.to_value())]),
        Category::new(
            "Egress VLANs",
            vec![
                P::new("Tagged", |i| i.vlan.tagging.to_value()),
                P::new("Untagged", |i| i.vlan.egress_untagged_vlans().to_value()),
            ],
        ),
        Category::new(
            "STP",
            vec![
                P::new("Enabled", |i| i.spanning_tree.enabled.to_value()),
                P::new("Auto edge", |i| i.spanning_tree.auto_edge.to_value()),
                P::new("Fast link", |i| i.spanning_tree.fast_link.to_value()),
            ],
        ),
        Category::new(
            "Power saving",
            vec![
                P::new("Auto off", |i| i.green_mode.energy_detect_enabled.to_value()),
                P::new("Short cable", |i| i.green_mode.short_reach_enabled.to_value()),
            ],
        ),
    ]
}

/// A titled table, the first row being the header.
struct Section {
    title: &'static str,
    rows: Vec<Vec<String>>,
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        writeln!(f, "{}", "=".repeat(self.title.len()))?;
        let mut builder = Builder::default();
        for row in &self.rows {
            builder.push_record(row.iter().cloned());
        }
        let mut table = builder.build();
        table.with(Style::psql());
        writeln!(f, "{}", table)
    }
}

/// Comparison report over a set of parsed configurations.
///
/// Switches are shown in order of their name.
pub struct Report<'a> {
    switches: Vec<&'a Configuration>,
}

impl<'a> Report<'a> {
    pub fn new(configs: impl IntoIterator<Item = &'a Configuration>) -> Report<'a> {
        let mut switches: Vec<_> = configs.into_iter().collect();
        switches.sort_by(|a, b| a.display_name().cmp(b.display_name()));
        Report { switches }
    }

    fn header(&self, first: &[&str]) -> Vec<String> {
        first
            .iter()
            .map(|s| s.to_string())
            .chain(self.switches.iter().map(|c| c.display_name().to_string()))
            .collect()
    }

    fn overview_table(&self) -> Section {
        let mut rows = vec![self.header(&["", ""])];
        for category in overview() {
            for (n, property) in category.properties.iter().enumerate() {
                let mut row = vec![
                    if n == 0 { category.name.to_string() } else { String::new() },
                    property.name.to_string(),
                ];
                row.extend(self.switches.iter().map(|c| (property.get)(c).to_string()));
                rows.push(row);
            }
        }
        Section {
            title: "Settings overview",
            rows,
        }
    }

    fn vlan_table(&self) -> Section {
        // id -> name -> indexes of the switches that use that name.
        let mut vlans: BTreeMap<VlanId, BTreeMap<&str, BTreeSet<usize>>> = BTreeMap::new();
        for (idx, cfg) in self.switches.iter().enumerate() {
            for (id, name) in &cfg.vlan_database {
                vlans.entry(*id).or_default().entry(name.as_str()).or_default().insert(idx);
            }
        }
        let mut rows = vec![self.header(&["ID", "Name"])];
        for (id, names) in &vlans {
            for (n, (name, present)) in names.iter().enumerate() {
                let mut row = vec![
                    if n == 0 { id.to_string() } else { String::new() },
                    name.to_string(),
                ];
                for i in 0..self.switches.len() {
                    row.push(Value::Boolean(present.contains(&i)).to_string());
                }
                rows.push(row);
            }
        }
        Section {
            title: "VLAN database",
            rows,
        }
    }

    fn mac_vlan_table(&self) -> Option<Section> {
        if self.switches.iter().all(|c| c.mac_based_vlans.is_empty()) {
            return None;
        }
        let mut rows = vec![vec![
            "MAC address".to_string(),
            "Switch".to_string(),
            "VLAN ID".to_string(),
        ]];
        for cfg in &self.switches {
            for (mac, id) in &cfg.mac_based_vlans {
                rows.push(vec![mac.to_string(), cfg.display_name().to_string(), id.to_string()]);
            }
        }
        Some(Section {
            title: "MAC-based VLANs",
            rows,
        })
    }

    fn interface_table(&self) -> Section {
        let columns = interface_columns();
        let mut header = vec!["Switch".to_string(), "ID".to_string()];
        for category in &columns {
            for property in &category.properties {
                if property.name.is_empty() {
                    header.push(category.name.to_string());
                } else {
                    header.push(format!("{} {}", category.name, property.name));
                }
            }
        }
        let mut rows = vec![header];
        for cfg in &self.switches {
            let enabled = cfg.sorted_interfaces().into_iter().filter(|i| i.enabled);
            for (n, intf) in enabled.enumerate() {
                let mut row = vec![
                    if n == 0 { cfg.display_name().to_string() } else { String::new() },
                    intf.id.clone(),
                ];
                for category in &columns {
                    row.extend(category.properties.iter().map(|p| (p.get)(intf).to_string()));
                }
                rows.push(row);
            }
        }
        Section {
            title: "Interfaces",
            rows,
        }
    }
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.overview_table())?;
        writeln!(f, "{}", self.vlan_table())?;
        if let Some(table) = self.mac_vlan_table() {
            writeln!(f, "{}", table)?;
        }
        write!(f, "{}", self.interface_table())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::REGISTRY;

    fn switch(model: &str, name: &str) -> Configuration {
        let mut cfg = REGISTRY.resolve(model).unwrap().build();
        cfg.snmp_server_sysname = Some(name.to_string());
        cfg
    }

    #[test]
    fn values() {
        assert_eq!(true.to_value().to_string(), "yes");
        assert_eq!(TriState::NotSupported.to_value().to_string(), "n/a");
        assert_eq!(AcceptFrame::All.to_value(), Value::Enum("Admit all"));
        assert_eq!(None::<u16>.to_value().to_string(), "-");
        assert_eq!(Vec::<String>::new().to_value().to_string(), "-");
        let set: BTreeSet<VlanId> = [3, 1].iter().copied().collect();
        assert_eq!(set.to_value().to_string(), "1, 3");
    }

    #[test]
    fn tristate_absence_is_visible() {
        let a = switch("GS108Tv2", "a");
        let b = switch("GS724Tv4", "b");
        let tcp_offset = overview()
            .into_iter()
            .flat_map(|c| c.properties)
            .find(|p| p.name == "TCP offset")
            .unwrap();
        assert_eq!((tcp_offset.get)(&a).to_string(), "n/a");
        assert_eq!((tcp_offset.get)(&b).to_string(), "no");
    }

    #[test]
    fn report() {
        let mut b = switch("GS724Tv4", "b-switch");
        b.vlan_database.insert(10, "Servers".to_string());
        b.interfaces.get_mut("g3").unwrap().enabled = false;
        let a = switch("GS108Tv2", "a-switch");
        let text = Report::new(vec![&b, &a]).to_string();

        assert!(text.starts_with("Settings overview\n"));
        let header = text.lines().nth(2).unwrap();
        assert!(header.find("a-switch").unwrap() < header.find("b-switch").unwrap());
        assert!(text.contains("VLAN database"));
        assert!(text.lines().nth(3).unwrap().starts_with("---"));
        assert!(text.lines().any(|l| l.trim_start().starts_with("10 ") && l.contains("Servers")));
        assert!(!text.contains("MAC-based VLANs"));
        assert!(text.lines().any(|l| l.trim_start().starts_with("b-switch") && l.contains(" g1 ")));
        assert!(!text.lines().any(|l| l.contains(" g3 ")));
        assert!(text.lines().any(|l| l.contains(" g10 ")));
    }

    #[test]
    fn voice_vlan_id() {
        let a = switch("GS108Tv2", "a-switch");
        let b = switch("GS724Tv4", "b-switch");
        let text = Report::new(vec![&a, &b]).to_string();
        let row = text.lines().find(|l| l.contains("| ID ")).unwrap();
        let cells: Vec<_> = row.split('|').map(str::trim).collect();
        assert_eq!(cells, vec!["", "ID", "2", "-"]);
    }

    #[test]
    fn mac_based_vlans() {
        let mut a = switch("GS724Tv4", "a-switch");
        a.mac_based_vlans.insert("00:1b:2c:3d:4e:5f".parse().unwrap(), 3);
        let text = Report::new(vec![&a]).to_string();
        assert!(text.contains("MAC-based VLANs"));
        let row = text.lines().find(|l| l.contains("00:1B:2C:3D:4E:5F")).unwrap();
        let cells: Vec<_> = row.split('|').map(str::trim).collect();
        assert_eq!(cells, vec!["00:1B:2C:3D:4E:5F", "a-switch", "3"]);
    }
}
