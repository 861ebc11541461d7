#![allow(non_snake_case)]
#![allow(non_upper_case_globals)]
#![allow(clippy::derive_partial_eq_without_eq)]
#![allow(clippy::too_many_lines)]

//! ROS1 message types generated at build time.
//!
//! Every `.msg` and `.srv` under `interfaces/` becomes a module at
//! `<package>::<msg|srv>::<name>`, re-exported from its kind module:
//!
//! ```
//! use ros1_msgs::std_msgs::msg::Header;
//! use ros1_types::RosMessage;
//!
//! assert_eq!(Header::MD5SUM, "2176decaecbce78abc3b96ef049fabed");
//! ```

pub use ros1_types;

mod generated {
    include!(concat!(env!("OUT_DIR"), "/generated/mod.rs"));
}

pub use generated::*;
