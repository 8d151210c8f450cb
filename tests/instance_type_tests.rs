//! Instance type parsing and upgrade/migration table tests

use awscost::instance_type::{
    ec2_generation_upgrade, ec2_graviton_equivalent, is_graviton_compatible_engine,
    latest_ec2_generation, parse_instance_type, parse_rds_instance_type, rds_generation_upgrade,
    rds_graviton_equivalent, rds_graviton_for_engine, InstanceType, GRAVITON_RDS_ENGINES,
};
use proptest::prelude::*;

#[test]
fn test_parse_examples() {
    let parsed = parse_instance_type("t2.medium");
    assert_eq!(parsed.family, "t2");
    assert_eq!(parsed.size, "medium");

    for bad in [".", "nosep", "t3.", ".large", ""] {
        assert_eq!(parse_instance_type(bad), InstanceType::default(), "input {:?}", bad);
    }
}

#[test]
fn test_parse_rds_examples() {
    let parsed = parse_rds_instance_type("db.t3.medium");
    assert_eq!(parsed.family, "db.t3");
    assert_eq!(parsed.size, "medium");

    for bad in ["t3.medium", "db.", "db.t3", "db..large", "DB.t3.medium"] {
        let parsed = parse_rds_instance_type(bad);
        assert!(!parsed.is_valid(), "input {:?}", bad);
        assert!(parsed.family.is_empty() && parsed.size.is_empty());
    }
}

#[test]
fn test_lookups_are_single_hop() {
    assert_eq!(ec2_generation_upgrade("m3"), Some("m4"));
    assert_eq!(ec2_generation_upgrade("m4"), Some("m5"));
    assert_eq!(latest_ec2_generation("m3"), "m6i");

    assert_eq!(rds_generation_upgrade("db.m4"), Some("db.m5"));
}

#[test]
fn test_missing_mappings_are_none() {
    assert_eq!(ec2_generation_upgrade("m7i"), None);
    assert_eq!(ec2_graviton_equivalent("m7g"), None);
    assert_eq!(rds_generation_upgrade("db.unknown"), None);
    assert_eq!(rds_graviton_equivalent("db.t4g"), None);
    // EC2 tables never answer for db. families and vice versa
    assert_eq!(ec2_graviton_equivalent("db.m5"), None);
    assert_eq!(rds_graviton_equivalent("m5"), None);
}

#[test]
fn test_proprietary_engines_never_migrate() {
    for engine in ["oracle-ee", "oracle-se2", "sqlserver-ee", "sqlserver-web", "db2-se", ""] {
        assert!(!is_graviton_compatible_engine(engine), "{}", engine);
        assert_eq!(rds_graviton_for_engine("db.r5", engine), None, "{}", engine);
    }
}

#[test]
fn test_allowed_engines_migrate() {
    for engine in GRAVITON_RDS_ENGINES {
        assert_eq!(rds_graviton_for_engine("db.r5", engine), Some("db.r6g"));
    }
    assert_eq!(rds_graviton_for_engine("db.m5", " MySQL "), Some("db.m6g"));
}

proptest! {
    #[test]
    fn test_parse_splits_on_first_dot(
        family in r"[a-z][a-z0-9]{0,6}",
        size in r"[a-z0-9]{1,10}",
    ) {
        let parsed = parse_instance_type(&format!("{}.{}", family, size));
        prop_assert!(parsed.is_valid());
        prop_assert_eq!(&parsed.family, &family);
        prop_assert_eq!(&parsed.size, &size);
        prop_assert_eq!(parsed.with_family(&family), format!("{}.{}", family, size));
    }

    #[test]
    fn test_rds_parse_keeps_prefix(
        family in r"[a-z][a-z0-9]{0,6}",
        size in r"[a-z0-9]{1,10}",
    ) {
        let parsed = parse_rds_instance_type(&format!("db.{}.{}", family, size));
        prop_assert_eq!(parsed.family, format!("db.{}", family));
        prop_assert_eq!(parsed.size, size);
    }

    #[test]
    fn test_no_separator_is_invalid(input in r"[a-z0-9]{0,12}") {
        prop_assert!(!parse_instance_type(&input).is_valid());
        prop_assert!(!parse_rds_instance_type(&input).is_valid());
    }

    #[test]
    fn test_engine_filter_only_removes(
        family in prop::sample::select(vec!["db.t3", "db.m5", "db.r5", "db.m6i", "db.x9"]),
        engine in r"[a-z0-9-]{0,16}",
    ) {
        let filtered = rds_graviton_for_engine(family, &engine);
        if let Some(target) = filtered {
            // The filter never invents a mapping
            prop_assert_eq!(Some(target), rds_graviton_equivalent(family));
            prop_assert!(is_graviton_compatible_engine(&engine));
        }
    }
}
