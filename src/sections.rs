//! Rule tables for the sections of an export body.
//!
//! Every line a supported firmware writes is listed here, either with
//! an action or explicitly ignored. Anything else is an error.
//! Table order matters: the first matching rule is used.
use once_cell::sync::Lazy;

use crate::error::{Error, Result};
use crate::model::{Configuration, Interface, MacAddr, VlanId};
use crate::parser::{dispatch, Rule};
use crate::reader::LineSource;
use crate::token::{parse_token, TriState};

const VLAN_LIST: &str = r"[0-9]{1,4}(,[0-9]{1,4})*";

static TOP_LEVEL: Lazy<Vec<Rule<Configuration>>> = Lazy::new(top_level_rules);
static CONFIGURE: Lazy<Vec<Rule<Configuration>>> = Lazy::new(configure_rules);
static INTERFACE: Lazy<Vec<Rule<Interface>>> = Lazy::new(interface_rules);
static VLAN_DATABASE: Lazy<Vec<Rule<Configuration>>> = Lazy::new(vlan_database_rules);
static LINECONFIG: Lazy<Vec<Rule<Configuration>>> = Lazy::new(|| vec![Rule::exit("exit")]);
static LINE_CONSOLE: Lazy<Vec<Rule<Configuration>>> =
    Lazy::new(|| vec![Rule::exit("exit"), Rule::ignore("serial timeout 0")]);
static LINE_TELNET: Lazy<Vec<Rule<Configuration>>> = Lazy::new(|| vec![Rule::exit("exit")]);

/// Parse everything after the header into `cfg`.
pub fn parse_body(lines: &mut dyn LineSource, cfg: &mut Configuration) -> Result<()> {
    dispatch(lines, cfg, "", &TOP_LEVEL)?;
    if let Some(line) = lines.next_line(true)? {
        return Err(Error::scope(
            format!("Trailing input after configuration: {}", line.text),
            line.number,
        ));
    }
    Ok(())
}

fn top_level_rules() -> Vec<Rule<Configuration>> {
    type R = Rule<Configuration>;
    vec![
        R::exact("configure", |lines, cfg, _| dispatch(lines, cfg, "configure", &CONFIGURE)),
        R::ignore("ip http secure-protocol TLS1"),
        R::pattern(r"^ip http session hard-timeout (?P<timeout>[0-9]{1,3})$", |_, cfg, args| {
            cfg.management.http_session_hard_timeout_hours = args.parse("timeout")?;
            Ok(())
        }),
        R::pattern(r"^ip http session soft-timeout (?P<timeout>[0-9]{1,2})$", |_, cfg, args| {
            cfg.management.http_session_soft_timeout_minutes = args.parse("timeout")?;
            Ok(())
        }),
        R::pattern(r"^network mgmt_vlan (?P<vlan>[0-9]+)$", |_, cfg, args| {
            cfg.management.vlan = args.parse("vlan")?;
            Ok(())
        }),
        R::pattern(
            r"^network parms (?P<address>\S+) (?P<mask>\S+) (?P<gateway>\S+)$",
            |_, cfg, args| {
                let ipv4 = &mut cfg.management.ipv4;
                ipv4.address = args.parse("address")?;
                ipv4.netmask = args.parse("mask")?;
                ipv4.gateway = args.parse("gateway")?;
                Ok(())
            },
        ),
        R::pattern(r"^network protocol (?P<protocol>bootp|dhcp|none)$", |_, cfg, args| {
            cfg.management.ipv4.protocol = parse_token(args.get("protocol"), args.line())?;
            Ok(())
        }),
        R::exact("no ip http java", |_, cfg, _| {
            cfg.management.java_enabled = false;
            Ok(())
        }),
        R::exact("no network ipv6 enable", |_, cfg, _| {
            cfg.management.ipv6_enabled = false;
            Ok(())
        }),
        R::exact("vlan database", |lines, cfg, _| {
            dispatch(lines, cfg, "vlan database", &VLAN_DATABASE)
        }),
    ]
}

fn configure_rules() -> Vec<Rule<Configuration>> {
    type R = Rule<Configuration>;
    vec![
        R::ignore("authentication login \"defaultList\"  local"),
        R::exact("clock source SNTP", |_, cfg, args| {
            cfg.clock_source = parse_token("SNTP", args.line())?;
            Ok(())
        }),
        R::exact("dos-control firstfrag", |_, cfg, _| {
            cfg.dos_control.ipv4_first_fragment_enabled = true;
            Ok(())
        }),
        R::pattern(r"^dos-control icmp(v4)?$", |_, cfg, _| {
            cfg.dos_control.icmpv4_max_size_enabled = true;
            Ok(())
        }),
        R::exact("dos-control icmpfrag", |_, cfg, _| {
            cfg.dos_control.icmp_fragment_enabled = TriState::True;
            Ok(())
        }),
        R::exact("dos-control icmpv6", |_, cfg, _| {
            cfg.dos_control.icmpv6_max_size_enabled = TriState::True;
            Ok(())
        }),
        R::exact("dos-control sipdip", |_, cfg, _| {
            cfg.dos_control.sip_equals_dip_enabled = true;
            Ok(())
        }),
        R::exact("dos-control smacdmac", |_, cfg, _| {
            cfg.dos_control.smac_equals_dmac_enabled = TriState::True;
            Ok(())
        }),
        R::exact("dos-control tcpfinurgpsh", |_, cfg, _| {
            cfg.dos_control.tcp_fin_urg_psh_enabled = TriState::True;
            Ok(())
        }),
        R::exact("dos-control tcpflag", |_, cfg, _| {
            cfg.dos_control.tcp_flag_enabled = TriState::True;
            Ok(())
        }),
        R::exact("dos-control tcpflagseq", |_, cfg, _| {
            cfg.dos_control.tcp_flag_sequence_enabled = TriState::True;
            Ok(())
        }),
        R::exact("dos-control tcpfrag", |_, cfg, _| {
            cfg.dos_control.tcp_fragment_enabled = true;
            Ok(())
        }),
        R::exact("dos-control tcpoffset", |_, cfg, _| {
            cfg.dos_control.tcp_offset_enabled = TriState::True;
            Ok(())
        }),
        R::exact("dos-control tcpsynfin", |_, cfg, _| {
            cfg.dos_control.tcp_syn_fin_enabled = TriState::True;
            Ok(())
        }),
        R::exit("exit"),
        // GS724Tv4
        R::exact("flowcontrol", |_, cfg, _| {
            cfg.flow_control_enabled = true;
            Ok(())
        }),
        R::exact("green-mode energy-detect", |_, cfg, _| {
            cfg.green_mode.energy_detect_enabled = true;
            Ok(())
        }),
        R::pattern(r"^green-mode (eee|short-reach auto)$", |_, cfg, _| {
            cfg.green_mode.short_reach_enabled = true;
            Ok(())
        }),
        R::pattern(r"^interface (?P<id>[0-9]+/[0-9]+|[a-z]+ ?[0-9]+)$", |lines, cfg, args| {
            let id = args.get("id");
            let intf = cfg.interfaces.get_mut(id).ok_or_else(|| {
                Error::semantic(format!("Invalid interface ID: {}", id), args.line())
            })?;
            dispatch(lines, intf, "interface", &INTERFACE)
        }),
        R::pattern(r"^ip dhcp (filtering|snooping)$", |_, cfg, _| {
            cfg.ipv4_dhcp_filtering_enabled = true;
            Ok(())
        }),
        R::pattern(r"^ip name server(?P<servers>( \S+)+)$", |_, cfg, args| {
            let servers = args.get("servers").split_whitespace().map(String::from).collect();
            cfg.dns_servers = Some(servers);
            Ok(())
        }),
        R::exact("lineconfig", |lines, cfg, _| dispatch(lines, cfg, "lineconfig", &LINECONFIG)),
        R::exact("line console", |lines, cfg, _| {
            dispatch(lines, cfg, "line console", &LINE_CONSOLE)
        }),
        R::exact("line telnet", |lines, cfg, _| dispatch(lines, cfg, "line telnet", &LINE_TELNET)),
        R::ignore_pattern(r"^logging host \S+ ipv4 [0-9]{1,5} info$"),
        R::ignore("logging syslog"),
        R::exact("no diffserv", |_, cfg, _| {
            cfg.diffserv_enabled = false;
            Ok(())
        }),
        R::ignore("no ip dhcp snooping verify mac-address"),
        R::ignore_pattern(r"^no port-channel linktrap lag [0-9]{1,2}$"),
        R::ignore_pattern(r"^no snmp-server community (mode )?(private|public)$"),
        R::ignore_pattern(r"^no snmp-server enable traps( (linkmode|mac|stpmode))?$"),
        R::exact("no voip status", |_, cfg, _| {
            cfg.voice_vlan.enabled = false;
            Ok(())
        }),
        R::pattern(r#"^snmp-server location "(?P<location>[^"]*)"$"#, |_, cfg, args| {
            cfg.snmp_server_location = Some(args.get("location").to_string());
            Ok(())
        }),
        R::pattern(r#"^snmp-server sysname "(?P<name>[^"]*)"$"#, |_, cfg, args| {
            cfg.snmp_server_sysname = Some(args.get("name").to_string());
            Ok(())
        }),
        R::pattern(r"^sntp client mode (?P<mode>(broad|uni)cast)$", |_, cfg, args| {
            cfg.sntp_client_mode = Some(parse_token(args.get("mode"), args.line())?);
            Ok(())
        }),
        R::pattern(r#"^sntp server "?(?P<server>[^\s"]+)"?$"#, |_, cfg, args| {
            cfg.sntp_servers.push(args.get("server").to_string());
            Ok(())
        }),
        R::exact("spanning-tree", |_, cfg, _| {
            cfg.spanning_tree.enabled = true;
            Ok(())
        }),
        R::pattern(r#"^spanning-tree configuration name "(?P<name>\S+)"$"#, |_, cfg, args| {
            cfg.spanning_tree.name = Some(args.get("name").to_string());
            Ok(())
        }),
        R::pattern(r"^spanning-tree forceversion (?P<version>802\.1[dsw])$", |_, cfg, args| {
            cfg.spanning_tree.version = parse_token(args.get("version"), args.line())?;
            Ok(())
        }),
        R::pattern(r"^spanning-tree mst priority 0 (?P<priority>[0-9]+)$", |_, cfg, args| {
            cfg.spanning_tree.cst_bridge_priority = args.parse("priority")?;
            Ok(())
        }),
        // GS108Tv2
        R::exact("storm-control flowcontrol", |_, cfg, _| {
            cfg.flow_control_enabled = true;
            Ok(())
        }),
        R::ignore_pattern(r#"^users passwd "admin" encrypted [0-9a-f]+$"#),
        R::ignore("users snmpv3 authentication admin sha"),
        R::ignore_pattern(r"^voip oui ([0-9A-F]{2}:){2}[0-9A-F]{2} desc \S+$"),
    ]
}

fn interface_rules() -> Vec<Rule<Interface>> {
    type R = Rule<Interface>;
    vec![
        R::exact("classofservice trust untrusted", |_, intf, _| {
            intf.cos_trusted = false;
            Ok(())
        }),
        R::pattern(r"^description '(?P<description>[^']*)'$", |_, intf, args| {
            intf.description = args.get("description").to_string();
            Ok(())
        }),
        R::exit("exit"),
        // Global setting only, the web interface has no per-port flow control.
        R::ignore("flowcontrol"),
        R::exact("green-mode energy-detect", |_, intf, _| {
            intf.green_mode.energy_detect_enabled = true;
            Ok(())
        }),
        R::pattern(r"^green-mode (eee|short-reach auto)$", |_, intf, _| {
            intf.green_mode.short_reach_enabled = true;
            Ok(())
        }),
        R::pattern(r"^ip dhcp (filtering|snooping) trust$", |_, intf, _| {
            intf.ipv4_dhcp_server_trusted = true;
            Ok(())
        }),
        R::ignore("lacp collector max-delay 0"),
        R::pattern(r"^mtu (?P<mtu>[0-9]+)$", |_, intf, args| {
            intf.mtu = args.parse("mtu")?;
            Ok(())
        }),
        R::ignore("no adminmode"),
        R::ignore_pattern(r"^no lldp "),
        R::exact("no snmp trap link-status", |_, intf, _| {
            intf.snmp_link_trap = false;
            Ok(())
        }),
        R::exact("no spanning-tree auto-edge", |_, intf, _| {
            intf.spanning_tree.auto_edge = TriState::False;
            Ok(())
        }),
        R::exact("shutdown", |_, intf, _| {
            intf.enabled = false;
            Ok(())
        }),
        R::exact("spanning-tree edgeport", |_, intf, _| {
            intf.spanning_tree.fast_link = true;
            Ok(())
        }),
        R::exact("spanning-tree port mode", |_, intf, _| {
            intf.spanning_tree.enabled = true;
            Ok(())
        }),
        R::pattern(r"^vlan acceptframe (?P<mode>all|vlanonly)$", |_, intf, args| {
            intf.vlan.accept_frame = parse_token(args.get("mode"), args.line())?;
            Ok(())
        }),
        R::exact("vlan ingressfilter", |_, intf, _| {
            intf.vlan.ingress_filter_enabled = true;
            Ok(())
        }),
        // Every interface starts out as a member of VLAN 1, this is how
        // that membership is given up.
        R::exact("vlan participation auto 1", |_, intf, _| {
            intf.vlan.membership.remove(&1);
            intf.vlan.tagging.remove(&1);
            Ok(())
        }),
        R::pattern(
            &format!(r"^vlan participation include (?P<ids>{})$", VLAN_LIST),
            |_, intf, args| {
                intf.vlan.membership.extend(args.parse_list::<VlanId>("ids")?);
                Ok(())
            },
        ),
        R::pattern(r"^vlan priority (?P<priority>[0-7])$", |_, intf, args| {
            intf.vlan.untagged_priority = args.parse("priority")?;
            Ok(())
        }),
        R::pattern(r"^vlan pvid (?P<id>[0-9]{1,4})$", |_, intf, args| {
            intf.vlan.pvid = args.parse("id")?;
            Ok(())
        }),
        R::pattern(
            &format!(r"^vlan tagging (?P<ids>{})$", VLAN_LIST),
            |_, intf, args| {
                let ids = args.parse_list::<VlanId>("ids")?;
                if let Some(id) = ids.iter().find(|&&id| !intf.vlan.membership.contains(&id)) {
                    return Err(Error::semantic(
                        format!("Interface {} is not a member of VLAN {}", intf.id, id),
                        args.line(),
                    ));
                }
                intf.vlan.tagging.extend(ids);
                Ok(())
            },
        ),
    ]
}

fn vlan_database_rules() -> Vec<Rule<Configuration>> {
    type R = Rule<Configuration>;
    vec![
        R::exit("exit"),
        R::pattern(
            &format!(r"^vlan (?P<ids>{})$", VLAN_LIST),
            |_, cfg, args| {
                for id in args.parse_list::<VlanId>("ids")? {
                    cfg.vlan_database.entry(id).or_insert_with(String::new);
                }
                Ok(())
            },
        ),
        R::pattern(r#"^vlan name (?P<id>[0-9]+) "(?P<name>[^"]*)"$"#, |_, cfg, args| {
            let id: VlanId = args.parse("id")?;
            let name = args.get("name");
            match cfg.vlan_database.get_mut(&id) {
                Some(entry) => *entry = name.to_string(),
                None => {
                    return Err(Error::semantic(
                        format!("Got name for unknown VLAN {}: {}", id, name),
                        args.line(),
                    ))
                }
            }
            Ok(())
        }),
        R::pattern(
            r"^vlan association mac (?P<mac>([0-9A-Fa-f]{2}:){5}[0-9A-Fa-f]{2}) (?P<id>[0-9]{1,4})$",
            |_, cfg, args| {
                let mac: MacAddr = args.parse("mac")?;
                let id: VlanId = args.parse("id")?;
                if !cfg.vlan_database.contains_key(&id) {
                    return Err(Error::semantic(
                        format!("MAC {} associated with unknown VLAN {}", mac, id),
                        args.line(),
                    ));
                }
                cfg.mac_based_vlans.insert(mac, id);
                Ok(())
            },
        ),
    ]
}
