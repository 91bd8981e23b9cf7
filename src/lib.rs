//! Parser for the text configuration exports of NETGEAR smart switches.
//!
//! An export starts with an NSDP header and two comments that declare
//! the switch model and firmware version. Those are validated first,
//! then the command lines are read section by section into a
//! [`Configuration`] that starts out with the defaults of the model.
//!
//! ```no_run
//! let cfg = ngswconf::from_file("switches/core-1.conf").unwrap();
//! for intf in cfg.sorted_interfaces() {
//!     println!("{}: untagged {:?}", intf.id, intf.vlan.egress_untagged_vlans());
//! }
//! ```
#[macro_use]
extern crate log;

mod batch;
mod cfg;
mod error;
mod header;
mod model;
mod parser;
mod reader;
mod registry;
mod sections;
mod token;
mod watcher;

pub mod report;

pub use batch::parse_dir;
pub use cfg::{from_file, from_reader, from_str, Builder};
pub use error::{Context, Error, ErrorKind, Result};
pub use model::*;
pub use registry::{ModelProfile, Registry, REGISTRY};
pub use token::*;
pub use watcher::Watcher;
