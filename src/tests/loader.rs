use crate::{
    apriori::gravdef::{gravitational_deformation, DeformationParser},
    cfg::{Error as ConfigError, ReferenceOpts},
    prelude::{Config, Epoch, Error, ReferenceParser, RunContext, VersionedReference},
    tests::{gravdef_station, gravdef_table, init_logger, run_date, TestDirectory},
};

use rstest::*;

const PATTERN: &str = "vlbi_gravitational_deformation_{version}.txt";

fn reference(dir: &TestDirectory) -> VersionedReference {
    VersionedReference::new(
        "vlbi_gravitational_deformation",
        &ReferenceOpts::new(dir.path(), PATTERN),
    )
}

#[rstest]
#[case(&["2019Dec01", "2020Jan15"], "2020Jan15")]
#[case(&["2020Jan15", "2019Dec01"], "2020Jan15")]
#[case(&["2019Dec01", "2021Mar03"], "2021Mar03")]
#[case(&["2019Dec01"], "2019Dec01")]
fn latest_version_on_disk(#[case] versions: &[&str], #[case] expected: &str) {
    init_logger();

    let dir = TestDirectory::new("latest");

    for version in versions {
        dir.write(
            &format!("vlbi_gravitational_deformation_{}.txt", version),
            &gravdef_table(&[(*version, 1.0, 0.0)]),
        );
    }

    dir.write("README", "not a version");
    dir.write("vlbi_gravitational_deformation_2099Jan01.txt.bak", "");

    let reference = reference(&dir);
    let version = reference.select().unwrap();
    assert_eq!(version.identifier(), expected);

    // version is selected regardless of run date
    let records = reference.load(&DeformationParser::default()).unwrap();
    assert_eq!(records.len(), 1);
    assert!(records.contains_key(expected));
}

#[test]
fn no_versions_on_disk() {
    let dir = TestDirectory::new("empty");
    dir.write("vlbi_gravitational_deformation_.txt", "");

    assert!(matches!(
        reference(&dir).select(),
        Err(Error::NoVersionsFound(category)) if category == "vlbi_gravitational_deformation"
    ));
}

#[test]
fn malformed_version_on_disk() {
    let dir = TestDirectory::new("malformed");
    dir.write(
        "vlbi_gravitational_deformation_2020Jan15.txt",
        &gravdef_table(&[]),
    );
    dir.write(
        "vlbi_gravitational_deformation_latest.txt",
        &gravdef_table(&[]),
    );

    assert!(matches!(
        reference(&dir).select(),
        Err(Error::MalformedVersion(id)) if id == "latest"
    ));
}

#[test]
fn missing_directory() {
    let reference = VersionedReference::new(
        "vlbi_gravitational_deformation",
        &ReferenceOpts::new("/this/does/not/exist", PATTERN),
    );
    assert!(matches!(reference.select(), Err(Error::Io { .. })));
}

#[test]
fn pattern_without_placeholder() {
    let dir = TestDirectory::new("placeholder");
    dir.write("vlbi_gravitational_deformation_2020Jan15.txt", &gravdef_table(&[]));

    let reference = VersionedReference::new(
        "vlbi_gravitational_deformation",
        &ReferenceOpts::new(dir.path(), "vlbi_gravitational_deformation.txt"),
    );

    assert!(matches!(
        reference.select(),
        Err(Error::Config(ConfigError::MissingVersionPlaceholder(pattern)))
            if pattern == "vlbi_gravitational_deformation.txt"
    ));
}

#[rstest]
#[case("STATION WETTZELL 2000-01-01T00:00:00\n0.0 1.0\nEND\n", 1)]
#[case("STATION WETTZELL 2000-01-01T00:00:00 2100-01-01T00:00:00\n0.0\nEND\n", 2)]
#[case("STATION WETTZELL 2000-01-01T00:00:00 2100-01-01T00:00:00\n0.0 abc\nEND\n", 2)]
#[case("0.0 1.0\n", 1)]
#[case("# header\nEND\n", 2)]
#[case("STATION WETTZELL not-a-date 2100-01-01T00:00:00\nEND\n", 1)]
#[case("STATION WETTZELL 2000-01-01T00:00:00 2100-01-01T00:00:00\n0.0 1.0\n", 2)]
fn malformed_tables(#[case] content: &str, #[case] line: usize) {
    let dir = TestDirectory::new("table");
    let path = dir.write("table.txt", content);

    match DeformationParser::default().parse(&path) {
        Err(Error::ReferenceParse { line: found, .. }) => assert_eq!(found, line),
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn duplicate_station() {
    let dir = TestDirectory::new("duplicate");
    let station = gravdef_station(
        "WETTZELL",
        "2000-01-01T00:00:00",
        "2100-01-01T00:00:00",
        1.0,
        0.0,
    );
    let path = dir.write("table.txt", &format!("{}{}", station, station));

    assert!(matches!(
        DeformationParser::default().parse(&path),
        Err(Error::ReferenceParse { line: 18, .. })
    ));
}

#[test]
fn gravitational_deformation_provider() {
    init_logger();

    let dir = TestDirectory::new("provider");

    // older version, must not be used
    dir.write(
        "vlbi_gravitational_deformation_2019Dec01.txt",
        &gravdef_table(&[("WETTZELL", 100.0, 0.0)]),
    );

    let mut content = gravdef_table(&[("WETTZELL", 10.0, -0.1), ("ONSALA60", 20.0, -0.2)]);
    content.push_str(&gravdef_station(
        "OUTDATED",
        "2000-01-01T00:00:00",
        "2010-01-01T00:00:00",
        1.0,
        0.0,
    ));
    // valid through midnight only: excluded
    content.push_str(&gravdef_station(
        "MIDNIGHT",
        "2000-01-01T00:00:00",
        "2020-02-10T00:00:00",
        1.0,
        0.0,
    ));

    dir.write("vlbi_gravitational_deformation_2020Jan15.txt", &content);

    let ctx = RunContext::new(run_date(), Config::with_reference_dir(dir.path()));
    let interpolators = gravitational_deformation(&ctx).unwrap();

    assert_eq!(
        interpolators.keys().collect::<Vec<_>>(),
        vec!["ONSALA60", "WETTZELL"]
    );

    let wettzell = &interpolators["WETTZELL"];
    assert_eq!(wettzell.range(), (0.0, 90.0));

    for (elevation, expected) in [(0.0, 10.0), (15.0, 8.5), (30.0, 7.0), (37.5, 6.25)] {
        let delay = wettzell.eval(elevation).unwrap();
        assert!((delay - expected).abs() < 1.0E-9, "delay({}) = {}", elevation, delay);
    }

    assert!(matches!(
        wettzell.eval(-1.0),
        Err(Error::Extrapolation { .. })
    ));

    // run date on the next day: MIDNIGHT still excluded, others unchanged
    let ctx = RunContext::new(
        Epoch::from_gregorian_utc_at_midnight(2020, 2, 11),
        Config::with_reference_dir(dir.path()),
    );
    assert_eq!(gravitational_deformation(&ctx).unwrap().len(), 2);
}
