use std::fs;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use crate::error::Result;
use crate::header::parse_header;
use crate::model::Configuration;
use crate::reader::LineReader;
use crate::registry::{Registry, REGISTRY};
use crate::sections::parse_body;

/// Read a configuration from a string.
pub fn from_str(s: &str) -> Result<Configuration> {
    Builder::new().from_str(s)
}

/// Read a configuration from a buffered reader.
pub fn from_reader<R: BufRead>(reader: R) -> Result<Configuration> {
    Builder::new().from_reader(reader)
}

/// Read a configuration from a file.
pub fn from_file(name: impl AsRef<Path>) -> io::Result<Configuration> {
    Builder::new().from_file(name)
}

/// Configuration parser builder.
///
/// ```no_run
/// let cfg = ngswconf::Builder::new()
///     .file_name("core-1")
///     .from_str("...");
/// ```
#[derive(Default)]
pub struct Builder<'a> {
    registry: Option<&'a Registry>,
    file_name: Option<String>,
}

impl<'a> Builder<'a> {
    /// Create a new builder.
    pub fn new() -> Builder<'a> {
        Builder::default()
    }

    /// Use another set of switch models than the built-in one.
    pub fn registry(mut self, registry: &'a Registry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Name of the input in error messages.
    pub fn file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = Some(name.into());
        self
    }

    /// Read a configuration from a string.
    pub fn from_str(self, s: &str) -> Result<Configuration> {
        self.from_reader(s.as_bytes())
    }

    /// Parse an export from a buffered reader. The reader is consumed
    /// and dropped when parsing ends, successfully or not.
    pub fn from_reader<R: BufRead>(self, reader: R) -> Result<Configuration> {
        let registry = self.registry.unwrap_or(&*REGISTRY);
        let mut lines = LineReader::new(reader);
        let result = parse_header(&mut lines, registry).and_then(|mut cfg| {
            parse_body(&mut lines, &mut cfg)?;
            Ok(cfg)
        });
        result.map_err(|mut e| {
            if let Some(name) = self.file_name {
                e.file_name = name;
            }
            e
        })
    }

    /// Read a configuration from a file.
    pub fn from_file(mut self, name: impl AsRef<Path>) -> io::Result<Configuration> {
        let name = name.as_ref();
        let file = fs::File::open(name)
            .map_err(|e| io::Error::new(e.kind(), format!("{}: {}", name.display(), e)))?;
        if self.file_name.is_none() {
            self.file_name = Some(name.display().to_string());
        }
        let cfg = self.from_reader(BufReader::new(file))?;
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::model::InterfaceKind;
    use crate::registry::ModelProfile;
    use crate::token::TriState;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    const GS108TV2: &str = include_str!("../testdata/gs108tv2.conf");
    const GS724TV4: &str = include_str!("../testdata/gs724tv4.conf");

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn gs108tv2() {
        init();
        let cfg = from_str(GS108TV2).unwrap();
        assert_eq!(cfg.model, "GS108Tv2");
        assert_eq!(cfg.firmware_version, "5.4.2.30");
        assert_eq!(cfg.display_name(), "office-sw1");
        assert!(cfg.flow_control_enabled);
        assert_eq!(cfg.vlan_database[&10], "Office");
        let uplink = &cfg.interfaces["0/8"];
        assert_eq!(uplink.description, "uplink");
        assert_eq!(uplink.vlan.tagging.iter().copied().collect::<Vec<_>>(), vec![10, 20]);
        assert_eq!(uplink.vlan.egress_untagged_vlans().into_iter().collect::<Vec<_>>(), vec![1]);
        assert!(!cfg.interfaces["0/7"].enabled);
        assert_eq!(cfg.dos_control.l4_port_enabled, TriState::False);
        assert_eq!(cfg.dos_control.tcp_flag_enabled, TriState::True);
    }

    #[test]
    fn gs724tv4() {
        init();
        let cfg = from_str(GS724TV4).unwrap();
        assert_eq!(cfg.model, "GS724Tv4");
        assert_eq!(cfg.firmware_version, "6.0.1.16");
        assert_eq!(cfg.display_name(), "core-sw1");
        assert_eq!(cfg.spanning_tree.cst_bridge_priority, 4096);
        assert_eq!(cfg.dns_servers.as_ref().map(|v| v.len()), Some(2));
        let g1 = &cfg.interfaces["g1"];
        assert_eq!(g1.vlan.ingress_untagged_vlan(), Some(10));
        let lag = &cfg.interfaces["lag 1"];
        assert_eq!(lag.kind, InterfaceKind::LinkAggregationGroup);
        assert_eq!(lag.vlan.tagging.len(), 3);
        assert_eq!(cfg.mac_based_vlans.len(), 1);
    }

    #[test]
    fn parsing_is_deterministic() {
        let a = from_reader(GS724TV4.as_bytes()).unwrap();
        let b = from_str(GS724TV4).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn header_mismatch_stops_parsing() {
        let text = GS108TV2.replacen(
            "0x4e470x010x00GS108Tv2",
            "0x4e470x010x00GS7XXT",
            1,
        );
        let e = from_str(&text).unwrap_err();
        assert_eq!(e.kind(), ErrorKind::Header);
        assert!(e.context.is_empty());
    }

    #[test]
    fn file_name_in_errors() {
        let text = GS724TV4.replace("vlan pvid 10", "vlan pvid ten");
        let e = Builder::new().file_name("core.conf").from_str(&text).unwrap_err();
        assert_eq!(e.kind(), ErrorKind::Scope);
        assert!(e.to_string().starts_with("core.conf:"));
        assert_eq!(e.context.len(), 2);
    }

    #[test]
    fn from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sw.conf");
        let mut f = fs::File::create(&path).unwrap();
        f.write_all(GS108TV2.as_bytes()).unwrap();
        drop(f);
        let cfg = super::from_file(&path).unwrap();
        assert_eq!(cfg.model, "GS108Tv2");

        let missing = super::from_file(dir.path().join("nope.conf")).unwrap_err();
        assert_eq!(missing.kind(), io::ErrorKind::NotFound);

        fs::write(&path, GS108TV2.replace("no diffserv", "no diffserv please")).unwrap();
        let e = super::from_file(&path).unwrap_err();
        assert_eq!(e.kind(), io::ErrorKind::InvalidData);
        assert!(e.to_string().contains("sw.conf"));
    }

    #[test]
    fn custom_registry() {
        let mut profile: ModelProfile = REGISTRY.resolve("GS108Tv2").unwrap().clone();
        profile.token = "GS108Tv3";
        profile.header_name = "GS108Tv3";
        profile.interfaces = vec![("0/{}", 1, 10, InterfaceKind::Physical)];
        let registry = Registry::new(vec![profile]);
        let text = "0x4e470x010x00GS108Tv3 1.0.0.1 0x000000000x00000000000000
!System Description \"GS108Tv3 8-Port\"
!System Software Version \"1.0.0.1\"
configure
interface 0/10
shutdown
exit
exit
";
        let cfg = Builder::new().registry(&registry).from_str(text).unwrap();
        assert!(!cfg.interfaces["0/10"].enabled);
        assert_eq!(from_str(text).unwrap_err().kind(), ErrorKind::Header);
    }
}
