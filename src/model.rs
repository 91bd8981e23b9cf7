//! The configuration of one switch, as read from its text export.
//!
//! A `Configuration` is created fully defaulted by a model profile
//! from the [registry](crate::registry) and then updated line by line
//! by the section grammars.
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Serialize, Serializer};

use crate::token::*;

pub type VlanId = u16;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Configuration {
    /// Model name from the system description, e.g. `GS724Tv4`.
    pub model: String,
    pub firmware_version: String,
    pub clock_source: ClockSource,
    pub diffserv_enabled: bool,
    pub dns_servers: Option<Vec<String>>,
    pub dos_control: DosControl,
    pub flow_control_enabled: bool,
    pub green_mode: GreenMode,
    pub interfaces: BTreeMap<String, Interface>,
    pub ipv4_dhcp_filtering_enabled: bool,
    pub management: ManagementInterface,
    pub snmp_server_sysname: Option<String>,
    pub snmp_server_location: Option<String>,
    pub sntp_client_mode: Option<SntpClientMode>,
    pub sntp_servers: Vec<String>,
    pub spanning_tree: SpanningTree,
    /// VLAN id to name.
    pub vlan_database: BTreeMap<VlanId, String>,
    pub mac_based_vlans: BTreeMap<MacAddr, VlanId>,
    pub voice_vlan: VoiceVlan,
}

impl Configuration {
    /// A configuration without interfaces or VLANs, with the defaults
    /// that all models share.
    pub fn new(model: impl Into<String>) -> Configuration {
        Configuration {
            model: model.into(),
            firmware_version: String::new(),
            clock_source: ClockSource::Local,
            diffserv_enabled: true,
            dns_servers: None,
            dos_control: DosControl::default(),
            flow_control_enabled: false,
            green_mode: GreenMode::default(),
            interfaces: BTreeMap::new(),
            ipv4_dhcp_filtering_enabled: false,
            management: ManagementInterface::default(),
            snmp_server_sysname: None,
            snmp_server_location: None,
            sntp_client_mode: None,
            sntp_servers: Vec::new(),
            spanning_tree: SpanningTree::default(),
            vlan_database: BTreeMap::new(),
            mac_based_vlans: BTreeMap::new(),
            voice_vlan: VoiceVlan::default(),
        }
    }

    /// The name used to identify this switch in reports.
    pub fn display_name(&self) -> &str {
        self.snmp_server_sysname.as_deref().unwrap_or(&self.model)
    }

    /// Interfaces in human order (`g2` before `g10`).
    pub fn sorted_interfaces(&self) -> Vec<&Interface> {
        let mut v: Vec<_> = self.interfaces.values().collect();
        v.sort_by(|a, b| a.sort_key.cmp(&b.sort_key));
        v
    }
}

/// Denial-of-service protection settings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DosControl {
    pub icmp_fragment_enabled: TriState,
    pub icmpv4_max_size: u32,
    pub icmpv4_max_size_enabled: bool,
    pub icmpv6_max_size: Option<u32>,
    pub icmpv6_max_size_enabled: TriState,
    pub ipv4_first_fragment_enabled: bool,
    pub l4_port_enabled: TriState,
    pub sip_equals_dip_enabled: bool,
    pub smac_equals_dmac_enabled: TriState,
    pub tcp_fin_urg_psh_enabled: TriState,
    pub tcp_flag_enabled: TriState,
    pub tcp_flag_sequence_enabled: TriState,
    pub tcp_fragment_enabled: bool,
    pub tcp_offset_enabled: TriState,
    pub tcp_syn_fin_enabled: TriState,
}

impl Default for DosControl {
    fn default() -> DosControl {
        DosControl {
            icmp_fragment_enabled: TriState::NotSupported,
            icmpv4_max_size: 512,
            icmpv4_max_size_enabled: false,
            icmpv6_max_size: None,
            icmpv6_max_size_enabled: TriState::NotSupported,
            ipv4_first_fragment_enabled: false,
            l4_port_enabled: TriState::NotSupported,
            sip_equals_dip_enabled: false,
            smac_equals_dmac_enabled: TriState::NotSupported,
            tcp_fin_urg_psh_enabled: TriState::NotSupported,
            tcp_flag_enabled: TriState::NotSupported,
            tcp_flag_sequence_enabled: TriState::NotSupported,
            tcp_fragment_enabled: false,
            tcp_offset_enabled: TriState::NotSupported,
            tcp_syn_fin_enabled: TriState::NotSupported,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GreenMode {
    /// Auto power down.
    pub energy_detect_enabled: bool,
    /// Short cable mode, or EEE on newer firmware.
    pub short_reach_enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManagementInterface {
    pub http_session_hard_timeout_hours: u32,
    pub http_session_soft_timeout_minutes: u32,
    pub java_enabled: bool,
    pub vlan: VlanId,
    pub ipv4: Ipv4Management,
    pub ipv6_enabled: bool,
}

impl Default for ManagementInterface {
    fn default() -> ManagementInterface {
        ManagementInterface {
            http_session_hard_timeout_hours: 24,
            http_session_soft_timeout_minutes: 5,
            java_enabled: true,
            vlan: 1,
            ipv4: Ipv4Management::default(),
            ipv6_enabled: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ipv4Management {
    pub address: Ipv4Addr,
    pub netmask: Ipv4Addr,
    pub gateway: Ipv4Addr,
    pub protocol: AddressingProtocol,
}

impl Default for Ipv4Management {
    fn default() -> Ipv4Management {
        Ipv4Management {
            address: Ipv4Addr::new(192, 168, 0, 239),
            netmask: Ipv4Addr::new(255, 255, 255, 0),
            gateway: Ipv4Addr::UNSPECIFIED,
            protocol: AddressingProtocol::Dhcp,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpanningTree {
    pub enabled: bool,
    pub name: Option<String>,
    pub version: SpanningTreeVersion,
    pub cst_bridge_priority: u16,
}

impl Default for SpanningTree {
    fn default() -> SpanningTree {
        SpanningTree {
            enabled: false,
            name: None,
            version: SpanningTreeVersion::Rstp,
            cst_bridge_priority: 32768,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VoiceVlan {
    pub enabled: bool,
    /// VLAN that carries voice traffic, if the model has a fixed one.
    pub id: Option<VlanId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum InterfaceKind {
    Physical,
    LinkAggregationGroup,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Interface {
    pub id: String,
    pub kind: InterfaceKind,
    pub sort_key: String,
    pub enabled: bool,
    pub description: String,
    pub mtu: u16,
    pub cos_trusted: bool,
    pub ipv4_dhcp_server_trusted: bool,
    pub snmp_link_trap: bool,
    pub spanning_tree: InterfaceSpanningTree,
    pub green_mode: GreenMode,
    pub vlan: InterfaceVlan,
}

impl Interface {
    pub fn new(id: impl Into<String>, kind: InterfaceKind) -> Interface {
        let id = id.into();
        Interface {
            sort_key: sort_key(&id),
            description: id.clone(),
            id,
            kind,
            enabled: true,
            mtu: 1518,
            cos_trusted: true,
            ipv4_dhcp_server_trusted: false,
            snmp_link_trap: true,
            spanning_tree: InterfaceSpanningTree::default(),
            green_mode: GreenMode::default(),
            vlan: InterfaceVlan::default(),
        }
    }
}

// "g7" -> "g07", "lag 12" -> "lag 12". Ids without an alphabetic
// prefix ("0/3") already sort correctly and are used as is.
fn sort_key(id: &str) -> String {
    static RE_SORT: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"^([^0-9]+?)([1-9][0-9]?)$").expect("could not compile RE_SORT regexp")
    });
    match RE_SORT.captures(id) {
        Some(caps) => {
            let n: u32 = caps[2].parse().unwrap_or(0);
            format!("{}{:02}", &caps[1], n)
        }
        None => id.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InterfaceSpanningTree {
    pub enabled: bool,
    pub auto_edge: TriState,
    /// Edge port.
    pub fast_link: bool,
}

impl Default for InterfaceSpanningTree {
    fn default() -> InterfaceSpanningTree {
        InterfaceSpanningTree {
            enabled: false,
            auto_edge: TriState::NotSupported,
            fast_link: false,
        }
    }
}

/// VLAN settings of one interface.
///
/// The `*_untagged_*` methods derive what actually happens to untagged
/// traffic from the raw settings. They are computed on every call since
/// the raw settings change while a configuration is being parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InterfaceVlan {
    pub accept_frame: AcceptFrame,
    pub ingress_filter_enabled: bool,
    pub membership: BTreeSet<VlanId>,
    pub pvid: VlanId,
    /// Always a subset of `membership`.
    pub tagging: BTreeSet<VlanId>,
    pub untagged_priority: u8,
}

impl Default for InterfaceVlan {
    fn default() -> InterfaceVlan {
        let mut membership = BTreeSet::new();
        membership.insert(1);
        InterfaceVlan {
            accept_frame: AcceptFrame::All,
            ingress_filter_enabled: false,
            membership,
            pvid: 1,
            tagging: BTreeSet::new(),
            untagged_priority: 0,
        }
    }
}

impl InterfaceVlan {
    pub fn accepts_untagged_frames(&self) -> bool {
        self.accept_frame == AcceptFrame::All
            && (!self.ingress_filter_enabled || self.membership.contains(&self.pvid))
    }

    /// VLANs that leave this interface without a tag.
    pub fn egress_untagged_vlans(&self) -> BTreeSet<VlanId> {
        self.membership.difference(&self.tagging).copied().collect()
    }

    /// The VLAN untagged ingress traffic ends up in, if it is accepted.
    pub fn ingress_untagged_vlan(&self) -> Option<VlanId> {
        if self.accepts_untagged_frames() {
            Some(self.pvid)
        } else {
            None
        }
    }

    pub fn ingress_untagged_priority(&self) -> Option<u8> {
        if self.accepts_untagged_frames() {
            Some(self.untagged_priority)
        } else {
            None
        }
    }
}

/// A 48 bit ethernet address, shown as `00:1B:2C:3D:4E:5F`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MacAddr(pub [u8; 6]);

impl FromStr for MacAddr {
    type Err = String;

    fn from_str(s: &str) -> Result<MacAddr, String> {
        let mut octets = [0u8; 6];
        let mut parts = s.split(|c| c == ':' || c == '-');
        for octet in octets.iter_mut() {
            let part = parts.next().ok_or_else(|| format!("invalid MAC address: {}", s))?;
            if part.len() != 2 {
                return Err(format!("invalid MAC address: {}", s));
            }
            *octet =
                u8::from_str_radix(part, 16).map_err(|_| format!("invalid MAC address: {}", s))?;
        }
        if parts.next().is_some() {
            return Err(format!("invalid MAC address: {}", s));
        }
        Ok(MacAddr(octets))
    }
}

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let o = &self.0;
        write!(
            f,
            "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}",
            o[0], o[1], o[2], o[3], o[4], o[5]
        )
    }
}

impl Serialize for MacAddr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
