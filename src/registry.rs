//! Per-model default configurations.
//!
//! Each supported switch family is described by a `ModelProfile`: the
//! interfaces it has, the VLANs that exist out of the box and the
//! settings that differ from the common defaults. Adding a model is a
//! matter of adding a profile.
use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::*;
use crate::token::*;

#[derive(Debug, Clone)]
pub struct ModelProfile {
    /// Model name as it appears in the system description comment.
    pub token: &'static str,
    /// Model name as it appears in the header line.
    pub header_name: &'static str,
    /// (format, first, last, kind) - `{}` in format is replaced by the number.
    pub interfaces: Vec<(&'static str, u32, u32, InterfaceKind)>,
    pub vlans: Vec<(VlanId, &'static str)>,
    pub dos_control: DosControl,
    pub spanning_tree: SpanningTree,
    pub voice_vlan_enabled: bool,
    pub voice_vlan_id: Option<VlanId>,
    pub interface_spanning_tree: InterfaceSpanningTree,
    /// Defaults that have not been checked against an export of a real
    /// switch of this model.
    pub unverified: Vec<&'static str>,
}

impl ModelProfile {
    /// Build a configuration with all defaults of this model.
    pub fn build(&self) -> Configuration {
        if !self.unverified.is_empty() {
            debug!("{}: unverified defaults: {}", self.token, self.unverified.join(", "));
        }
        let mut cfg = Configuration::new(self.token);
        cfg.dos_control = self.dos_control.clone();
        cfg.spanning_tree = self.spanning_tree.clone();
        cfg.voice_vlan.enabled = self.voice_vlan_enabled;
        cfg.voice_vlan.id = self.voice_vlan_id;

        for &(fmt, first, last, kind) in &self.interfaces {
            for n in first..=last {
                let id = fmt.replace("{}", &n.to_string());
                let mut intf = Interface::new(id.as_str(), kind);
                intf.spanning_tree = self.interface_spanning_tree.clone();
                cfg.interfaces.insert(id, intf);
            }
        }
        for &(id, name) in &self.vlans {
            cfg.vlan_database.insert(id, name.to_string());
        }
        cfg
    }
}

/// The set of switch models the parser knows about.
#[derive(Debug, Clone)]
pub struct Registry {
    profiles: Vec<ModelProfile>,
    header_re: Regex,
}

impl Registry {
    pub fn new(profiles: Vec<ModelProfile>) -> Registry {
        let mut names: Vec<_> = profiles.iter().map(|p| regex::escape(p.header_name)).collect();
        names.sort();
        names.dedup();
        let re = format!(
            r"^{}(?P<model>{}) +(?P<version>{}) +{}$",
            HEADER_BEGIN,
            names.join("|"),
            VERSION_RE,
            HEADER_END
        );
        let header_re = Regex::new(&re).expect("could not compile header regexp");
        Registry { profiles, header_re }
    }

    /// Look up a model by its system description name.
    pub fn resolve(&self, token: &str) -> Option<&ModelProfile> {
        self.profiles.iter().find(|p| p.token == token)
    }

    pub fn profiles(&self) -> &[ModelProfile] {
        &self.profiles
    }

    /// Regexp for the header line, with `model` and `version` captures.
    pub(crate) fn header_re(&self) -> &Regex {
        &self.header_re
    }
}

impl Default for Registry {
    fn default() -> Registry {
        Registry::new(vec![gs108tv2(), gs724tv4()])
    }
}

pub(crate) const HEADER_BEGIN: &str = "0x4e470x010x00";
pub(crate) const HEADER_END: &str = "0x000000000x00000000000000";
pub(crate) const VERSION_RE: &str = r"[0-9]{1,2}\.[0-9]{1,2}\.[0-9]{1,2}\.[0-9]{1,2}";

/// The built-in registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(Registry::default);

fn gs108tv2() -> ModelProfile {
    ModelProfile {
        token: "GS108Tv2",
        header_name: "GS108Tv2",
        interfaces: vec![
            ("0/{}", 1, 8, InterfaceKind::Physical),
            ("3/{}", 1, 4, InterfaceKind::LinkAggregationGroup),
        ],
        vlans: vec![(1, "Default"), (2, "Voice VLAN"), (3, "Auto-Video")],
        dos_control: DosControl {
            l4_port_enabled: TriState::False,
            tcp_flag_enabled: TriState::False,
            ..DosControl::default()
        },
        spanning_tree: SpanningTree {
            enabled: false,
            version: SpanningTreeVersion::Mstp,
            ..SpanningTree::default()
        },
        voice_vlan_enabled: true,
        voice_vlan_id: Some(2),
        interface_spanning_tree: InterfaceSpanningTree::default(),
        unverified: vec![
            "dos-control icmpv4 maximum size",
            "http session timeouts",
            "spanning-tree version",
            "voice vlan id",
        ],
    }
}

fn gs724tv4() -> ModelProfile {
    ModelProfile {
        token: "GS724Tv4",
        header_name: "GS7XXT",
        interfaces: vec![
            ("g{}", 1, 26, InterfaceKind::Physical),
            ("lag {}", 1, 26, InterfaceKind::LinkAggregationGroup),
        ],
        vlans: vec![(1, "Default"), (2, "Auto VoIP"), (3, "Auto-Video")],
        dos_control: DosControl {
            icmp_fragment_enabled: TriState::False,
            icmpv6_max_size: Some(512),
            icmpv6_max_size_enabled: TriState::False,
            smac_equals_dmac_enabled: TriState::False,
            tcp_fin_urg_psh_enabled: TriState::False,
            tcp_flag_sequence_enabled: TriState::False,
            tcp_offset_enabled: TriState::False,
            tcp_syn_fin_enabled: TriState::False,
            ..DosControl::default()
        },
        spanning_tree: SpanningTree {
            enabled: true,
            version: SpanningTreeVersion::Rstp,
            ..SpanningTree::default()
        },
        voice_vlan_enabled: false,
        voice_vlan_id: None,
        interface_spanning_tree: InterfaceSpanningTree {
            enabled: true,
            auto_edge: TriState::True,
            fast_link: false,
        },
        unverified: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve() {
        let p = REGISTRY.resolve("GS724Tv4").unwrap();
        assert_eq!(p.header_name, "GS7XXT");
        assert!(REGISTRY.resolve("GS7XXT").is_none());
        assert!(REGISTRY.resolve("GS110TP").is_none());
    }

    #[test]
    fn gs108tv2_defaults() {
        let cfg = REGISTRY.resolve("GS108Tv2").unwrap().build();
        assert_eq!(cfg.model, "GS108Tv2");
        assert_eq!(cfg.interfaces.len(), 12);
        assert!(cfg.interfaces.contains_key("0/8"));
        assert_eq!(cfg.interfaces["3/2"].kind, InterfaceKind::LinkAggregationGroup);
        assert_eq!(cfg.vlan_database[&2], "Voice VLAN");
        assert_eq!(cfg.dos_control.tcp_flag_enabled, TriState::False);
        assert_eq!(cfg.dos_control.tcp_syn_fin_enabled, TriState::NotSupported);
        assert_eq!(cfg.spanning_tree.version, SpanningTreeVersion::Mstp);
        assert!(cfg.voice_vlan.enabled);
        assert_eq!(cfg.voice_vlan.id, Some(2));
        assert_eq!(cfg.interfaces["0/1"].spanning_tree.auto_edge, TriState::NotSupported);
    }

    #[test]
    fn gs724tv4_defaults() {
        let cfg = REGISTRY.resolve("GS724Tv4").unwrap().build();
        assert_eq!(cfg.interfaces.len(), 52);
        let lag = &cfg.interfaces["lag 26"];
        assert_eq!(lag.sort_key, "lag 26");
        assert!(lag.spanning_tree.enabled);
        assert_eq!(lag.spanning_tree.auto_edge, TriState::True);
        assert_eq!(cfg.dos_control.icmpv6_max_size, Some(512));
        assert_eq!(cfg.dos_control.l4_port_enabled, TriState::NotSupported);
        assert!(cfg.spanning_tree.enabled);
        assert!(!cfg.voice_vlan.enabled);
        assert_eq!(cfg.voice_vlan.id, None);
    }

    #[test]
    fn header_regexp() {
        let re = REGISTRY.header_re();
        let caps = re
            .captures("0x4e470x010x00GS7XXT    6.0.1.16 0x000000000x00000000000000")
            .unwrap();
        assert_eq!(&caps["model"], "GS7XXT");
        assert_eq!(&caps["version"], "6.0.1.16");
        assert!(!re.is_match("0x4e470x010x00GS724Tv4 6.0.1.16 0x000000000x00000000000000"));
        assert!(!re.is_match("0x4e470x010x00GS108Tv2 5.4.2 0x000000000x00000000000000"));
    }
}
