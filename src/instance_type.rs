//! Instance type analysis
//!
//! Splits EC2 and RDS instance types into family and size, and answers the two
//! recommendation questions this crate knows about:
//!
//! - Generation upgrade: is there a newer family at the same or lower list
//!   price with equal or better performance? (`m5` -> `m6i`)
//! - Graviton migration: is there an ARM family at roughly 20% lower cost?
//!   (`m5` -> `m6g`)
//!
//! All lookups are single hop. Apply them repeatedly to walk several
//! generations. A family missing from a table means "nothing to suggest".

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Prefix carried by every RDS instance class.
pub const RDS_PREFIX: &str = "db.";

/// Approximate saving from moving an x86 family to its Graviton equivalent.
pub const GRAVITON_SAVINGS_PERCENT: f64 = 20.0;

/// Engines with public Graviton support on RDS.
///
/// Oracle, SQL Server and Db2 are deliberately absent.
pub const GRAVITON_RDS_ENGINES: &[&str] = &[
    "mysql",
    "postgres",
    "postgresql",
    "mariadb",
    "aurora",
    "aurora-mysql",
    "aurora-postgresql",
];

/// Family and size of an instance type.
///
/// Both fields are empty when the input could not be parsed; check
/// [`InstanceType::is_valid`] rather than comparing the family to `""`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstanceType {
    pub family: String,
    pub size: String,
}

impl InstanceType {
    pub fn is_valid(&self) -> bool {
        !self.family.is_empty() && !self.size.is_empty()
    }

    /// Re-assembles `family.size`.
    pub fn with_family(&self, family: &str) -> String {
        format!("{}.{}", family, self.size)
    }
}

/// Parses an EC2 instance type such as `t3.medium`.
pub fn parse_instance_type(instance_type: &str) -> InstanceType {
    match instance_type.split_once('.') {
        Some((family, size)) if !family.is_empty() && !size.is_empty() => InstanceType {
            family: family.to_string(),
            size: size.to_string(),
        },
        _ => InstanceType::default(),
    }
}

/// Parses an RDS instance class such as `db.r5.large`, keeping `db.` on the family.
pub fn parse_rds_instance_type(instance_class: &str) -> InstanceType {
    let Some(rest) = instance_class.strip_prefix(RDS_PREFIX) else {
        return InstanceType::default();
    };

    let parsed = parse_instance_type(rest);
    if !parsed.is_valid() {
        return InstanceType::default();
    }

    InstanceType {
        family: format!("{}{}", RDS_PREFIX, parsed.family),
        size: parsed.size,
    }
}

type FamilyTable = Lazy<HashMap<&'static str, &'static str>>;

static EC2_GENERATION_UPGRADES: FamilyTable = Lazy::new(|| {
    HashMap::from([
        // Burstable
        ("t1", "t2"),
        ("t2", "t3"),
        // General purpose
        ("m1", "m3"),
        ("m3", "m4"),
        ("m4", "m5"),
        ("m5", "m6i"),
        ("m5a", "m6a"),
        ("m5n", "m6in"),
        // Compute optimized
        ("c1", "c3"),
        ("c3", "c4"),
        ("c4", "c5"),
        ("c5", "c6i"),
        ("c5a", "c6a"),
        ("c5n", "c6in"),
        // Memory optimized
        ("r3", "r4"),
        ("r4", "r5"),
        ("r5", "r6i"),
        ("r5a", "r6a"),
        ("r5n", "r6in"),
        ("x1", "x2idn"),
        // Storage optimized
        ("i2", "i3"),
        ("i3", "i4i"),
        ("d2", "d3"),
        // Accelerated
        ("p2", "p3"),
        ("g3", "g4dn"),
    ])
});

static RDS_GENERATION_UPGRADES: FamilyTable = Lazy::new(|| {
    HashMap::from([
        ("db.t2", "db.t3"),
        ("db.m3", "db.m4"),
        ("db.m4", "db.m5"),
        ("db.m5", "db.m6i"),
        ("db.r3", "db.r4"),
        ("db.r4", "db.r5"),
        ("db.r5", "db.r6i"),
    ])
});

static EC2_GRAVITON: FamilyTable = Lazy::new(|| {
    HashMap::from([
        ("t2", "t4g"),
        ("t3", "t4g"),
        ("t3a", "t4g"),
        ("m5", "m6g"),
        ("m5a", "m6g"),
        ("m5d", "m6gd"),
        ("m6i", "m7g"),
        ("m6a", "m7g"),
        ("m7i", "m7g"),
        ("c5", "c6g"),
        ("c5a", "c6g"),
        ("c5d", "c6gd"),
        ("c5n", "c6gn"),
        ("c6i", "c7g"),
        ("c7i", "c7g"),
        ("r5", "r6g"),
        ("r5a", "r6g"),
        ("r5d", "r6gd"),
        ("r6i", "r7g"),
        ("r7i", "r7g"),
        ("x2idn", "x2gd"),
        ("g4dn", "g5g"),
    ])
});

static RDS_GRAVITON: FamilyTable = Lazy::new(|| {
    HashMap::from([
        ("db.t3", "db.t4g"),
        ("db.m5", "db.m6g"),
        ("db.m6i", "db.m7g"),
        ("db.r5", "db.r6g"),
        ("db.r6i", "db.r7g"),
        ("db.x2iedn", "db.x2g"),
    ])
});

/// Next-generation EC2 family, if one is known.
pub fn ec2_generation_upgrade(family: &str) -> Option<&'static str> {
    EC2_GENERATION_UPGRADES.get(family).copied()
}

/// Next-generation RDS family (`db.` prefixed), if one is known.
pub fn rds_generation_upgrade(family: &str) -> Option<&'static str> {
    RDS_GENERATION_UPGRADES.get(family).copied()
}

/// Graviton equivalent of an x86 EC2 family.
pub fn ec2_graviton_equivalent(family: &str) -> Option<&'static str> {
    EC2_GRAVITON.get(family).copied()
}

/// Graviton equivalent of an RDS family, ignoring the engine.
///
/// Use [`rds_graviton_for_engine`] when the engine is known.
pub fn rds_graviton_equivalent(family: &str) -> Option<&'static str> {
    RDS_GRAVITON.get(family).copied()
}

pub fn is_graviton_compatible_engine(engine: &str) -> bool {
    let engine = engine.trim().to_ascii_lowercase();
    GRAVITON_RDS_ENGINES.contains(&engine.as_str())
}

/// Graviton equivalent of an RDS family for the given engine.
///
/// Proprietary engines never get a suggestion, even when the family has one.
pub fn rds_graviton_for_engine(family: &str, engine: &str) -> Option<&'static str> {
    if !is_graviton_compatible_engine(engine) {
        return None;
    }
    rds_graviton_equivalent(family)
}

/// Walks generation upgrades from `family` until no further hop exists.
///
/// Bounded by the table size so a cycle can never loop forever.
pub fn latest_ec2_generation(family: &str) -> String {
    let mut current = family.to_string();
    for _ in 0..EC2_GENERATION_UPGRADES.len() {
        match ec2_generation_upgrade(&current) {
            Some(next) => current = next.to_string(),
            None => break,
        }
    }
    current
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_instance_type() {
        let parsed = parse_instance_type("t2.medium");
        assert_eq!(parsed.family, "t2");
        assert_eq!(parsed.size, "medium");
        assert!(parsed.is_valid());

        let parsed = parse_instance_type("m5.24xlarge");
        assert_eq!((parsed.family.as_str(), parsed.size.as_str()), ("m5", "24xlarge"));
    }

    #[test]
    fn test_parse_instance_type_invalid() {
        for input in [".", "nosep", "", "t3.", ".large"] {
            let parsed = parse_instance_type(input);
            assert_eq!(parsed, InstanceType::default(), "input {:?}", input);
            assert!(!parsed.is_valid());
        }
    }

    #[test]
    fn test_parse_rds_instance_type() {
        let parsed = parse_rds_instance_type("db.t3.medium");
        assert_eq!(parsed.family, "db.t3");
        assert_eq!(parsed.size, "medium");
    }

    #[test]
    fn test_parse_rds_instance_type_invalid() {
        for input in ["t3.medium", "db.", "db.t3", "db..large", "db.t3.", "rds.t3.medium"] {
            assert_eq!(
                parse_rds_instance_type(input),
                InstanceType::default(),
                "input {:?}",
                input
            );
        }
    }

    #[test]
    fn test_generation_upgrade_is_single_hop() {
        assert_eq!(ec2_generation_upgrade("m4"), Some("m5"));
        assert_eq!(ec2_generation_upgrade("m5"), Some("m6i"));
        assert_eq!(ec2_generation_upgrade("m7i"), None);
        assert_eq!(rds_generation_upgrade("db.r4"), Some("db.r5"));
        assert_eq!(rds_generation_upgrade("db.r7g"), None);
    }

    #[test]
    fn test_latest_generation_walks_chain() {
        assert_eq!(latest_ec2_generation("m3"), "m6i");
        assert_eq!(latest_ec2_generation("t1"), "t3");
        assert_eq!(latest_ec2_generation("unknown"), "unknown");
    }

    #[test]
    fn test_graviton_lookups() {
        assert_eq!(ec2_graviton_equivalent("m5"), Some("m6g"));
        assert_eq!(ec2_graviton_equivalent("m6g"), None);
        assert_eq!(rds_graviton_equivalent("db.r5"), Some("db.r6g"));
    }

    #[test]
    fn test_rds_graviton_engine_filter() {
        assert_eq!(rds_graviton_for_engine("db.m5", "postgres"), Some("db.m6g"));
        assert_eq!(rds_graviton_for_engine("db.m5", "Aurora-PostgreSQL"), Some("db.m6g"));
        assert_eq!(rds_graviton_for_engine("db.m5", "oracle-ee"), None);
        assert_eq!(rds_graviton_for_engine("db.m5", "sqlserver-se"), None);
        assert_eq!(rds_graviton_for_engine("db.m5", ""), None);
    }

    #[test]
    fn test_tables_have_no_self_mappings() {
        for table in [
            &EC2_GENERATION_UPGRADES,
            &RDS_GENERATION_UPGRADES,
            &EC2_GRAVITON,
            &RDS_GRAVITON,
        ] {
            for (from, to) in table.iter() {
                assert_ne!(from, to);
            }
        }
    }
}
