//! The first lines of an export: the NSDP header and the system
//! description and software version comments.
//!
//! All three declare the model or firmware version. They must agree
//! before anything else in the file is trusted.
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Error, Result};
use crate::model::Configuration;
use crate::reader::LineSource;
use crate::registry::{Registry, VERSION_RE};

static RE_SYSTEM_DESCRIPTION: Lazy<Regex> = Lazy::new(|| {
    let re = r#"^!System Description "(?P<model>[^" ]+)( [^"]*)?"$"#;
    Regex::new(re).expect("could not compile RE_SYSTEM_DESCRIPTION regexp")
});

static RE_SOFTWARE_VERSION: Lazy<Regex> = Lazy::new(|| {
    let re = format!(r#"^!System Software Version "(?P<version>{})"$"#, VERSION_RE);
    Regex::new(&re).expect("could not compile RE_SOFTWARE_VERSION regexp")
});

/// Validate the header and return the default configuration for the
/// model it declares.
pub fn parse_header(lines: &mut dyn LineSource, registry: &Registry) -> Result<Configuration> {
    let first = match lines.next_line(false)? {
        Some(line) => line,
        None => {
            return Err(Error::header(
                "EOF before NSDP Text Configuration header",
                lines.line_number(),
            ))
        }
    };
    let caps = registry.header_re().captures(&first.text).ok_or_else(|| {
        Error::header(
            format!("NSDP Text Configuration header not found or invalid: {}", first.text),
            first.number,
        )
    })?;
    let header_model = &caps["model"];
    let header_version = &caps["version"];
    debug!("header: model {} firmware {}", header_model, header_version);

    // Both declarations are in the leading comment block, in any order.
    let mut description = None;
    let mut version = None;
    while description.is_none() || version.is_none() {
        let line = match lines.next_line(false)? {
            Some(line) => line,
            None => break,
        };
        if !line.comment {
            lines.push_back(line);
            break;
        }
        if description.is_none() {
            if let Some(caps) = RE_SYSTEM_DESCRIPTION.captures(&line.text) {
                description = Some((caps["model"].to_string(), line.number));
                continue;
            }
        }
        if version.is_none() {
            if let Some(caps) = RE_SOFTWARE_VERSION.captures(&line.text) {
                version = Some((caps["version"].to_string(), line.number));
            }
        }
    }

    let (model, model_line) = description
        .ok_or_else(|| Error::header("System description not found", lines.line_number()))?;
    let (version, version_line) = version
        .ok_or_else(|| Error::header("System software version not found", lines.line_number()))?;

    let profile = registry.resolve(&model).ok_or_else(|| {
        Error::header(format!("Unknown model in system description: {}", model), model_line)
    })?;
    if profile.header_name != header_model {
        return Err(Error::header(
            format!(
                "System description model name {} does not match NSDP Text Configuration header {}",
                model, header_model
            ),
            model_line,
        ));
    }
    // Compared as text: "6.0.1.06" is not "6.0.1.6".
    if version != header_version {
        return Err(Error::header(
            format!(
                "System software version {} does not match NSDP Text Configuration header {}",
                version, header_version
            ),
            version_line,
        ));
    }

    let mut cfg = profile.build();
    cfg.firmware_version = version;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::reader::LineReader;
    use crate::registry::REGISTRY;

    const HEADER_7XX: &str = "0x4e470x010x00GS7XXT 6.0.1.16 0x000000000x00000000000000";

    fn header(text: &str) -> Result<Configuration> {
        let mut lines = LineReader::new(text.as_bytes());
        parse_header(&mut lines, &REGISTRY)
    }

    fn text(first: &str, description: &str, version: &str) -> String {
        format!(
            "{}\n!Current Configuration:\n!\n!System Description \"{}\"\n\
             !System Software Version \"{}\"\n!\nvlan database\n",
            first, description, version
        )
    }

    #[test]
    fn valid() {
        let description = "GS724Tv4 ProSafe 24-port Gigabit Smart Switch";
        let cfg = header(&text(HEADER_7XX, description, "6.0.1.16")).unwrap();
        assert_eq!(cfg.model, "GS724Tv4");
        assert_eq!(cfg.firmware_version, "6.0.1.16");
        assert_eq!(cfg.interfaces.len(), 52);
    }

    #[test]
    fn stops_before_first_command() {
        let t = text(HEADER_7XX, "GS724Tv4", "6.0.1.16");
        let mut lines = LineReader::new(t.as_bytes());
        parse_header(&mut lines, &REGISTRY).unwrap();
        assert_eq!(lines.next_line(true).unwrap().unwrap().text, "vlan database");
    }

    #[test]
    fn declarations_in_any_order() {
        let t = format!(
            "\n{}\n!System Software Version \"6.0.1.16\"\n\
             !System Description \"GS724Tv4\"\nconfigure\n",
            HEADER_7XX
        );
        assert!(header(&t).is_ok());
    }

    #[test]
    fn model_mismatch() {
        let e = header(&text(HEADER_7XX, "GS108Tv2", "6.0.1.16")).unwrap_err();
        assert_eq!(e.kind(), ErrorKind::Header);
        assert_eq!(e.line, 4);
    }

    #[test]
    fn version_compared_as_text() {
        let first = "0x4e470x010x00GS7XXT 6.0.1.6 0x000000000x00000000000000";
        let e = header(&text(first, "GS724Tv4", "6.0.1.06")).unwrap_err();
        assert_eq!(e.kind(), ErrorKind::Header);
        assert!(e.msg.starts_with("System software version"));
    }

    #[test]
    fn bad_header_line() {
        let e = header(&text("0x4e47 GS7XXT 6.0.1.16", "GS724Tv4", "6.0.1.16")).unwrap_err();
        assert_eq!(e.kind(), ErrorKind::Header);
        assert_eq!(e.line, 1);
        let e = header("").unwrap_err();
        assert_eq!(e.msg, "EOF before NSDP Text Configuration header");
    }

    #[test]
    fn missing_declarations() {
        let t = format!(
            "{}\n!System Description \"GS724Tv4\"\nconfigure\n\
             !System Software Version \"6.0.1.16\"\n",
            HEADER_7XX
        );
        let e = header(&t).unwrap_err();
        assert_eq!(e.msg, "System software version not found");
        let t = format!("{}\n!System Software Version \"6.0.1.16\"\n", HEADER_7XX);
        let e = header(&t).unwrap_err();
        assert_eq!(e.msg, "System description not found");
    }

    #[test]
    fn unknown_model() {
        let e = header(&text(HEADER_7XX, "GS110TP", "6.0.1.16")).unwrap_err();
        assert_eq!(e.kind(), ErrorKind::Header);
        assert!(e.msg.contains("GS110TP"));
    }
}
