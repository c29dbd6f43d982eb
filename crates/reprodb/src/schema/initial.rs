//! The base schema: the tables a virgin tracking database starts with.
//!
//! This is the original version-1 shape of the database. Later shapes are
//! reached exclusively through the update batches in `updates.rs`; these
//! definitions are frozen and must never be edited to match newer versions.

use super::TableDef;

fn table(name: &str, statements: &[&str]) -> TableDef {
    TableDef::new(name, statements.iter().map(|s| s.to_string()).collect())
}

/// All base tables, ledger first.
pub fn tables() -> Vec<TableDef> {
    vec![
        table(
            "rb_schema",
            &["CREATE TABLE rb_schema
                 (version INTEGER NOT NULL,
                  date TEXT NOT NULL,
                  PRIMARY KEY (version))"],
        ),
        table(
            "source_packages",
            &["CREATE TABLE source_packages
                 (name TEXT NOT NULL,
                  version TEXT NOT NULL,
                  status TEXT NOT NULL
                  CHECK
                    (status IN
                        ('blacklisted', 'FTBFS', 'reproducible',
                         'unreproducible', '404', 'not for us')
                    ),
                  build_date TEXT NOT NULL,
                  PRIMARY KEY (name))"],
        ),
        table(
            "sources_scheduled",
            &["CREATE TABLE sources_scheduled
                 (name TEXT NOT NULL,
                  date_scheduled TEXT NOT NULL,
                  date_build_started TEXT NOT NULL,
                  PRIMARY KEY (name))"],
        ),
        table(
            "sources",
            &["CREATE TABLE sources
                 (name TEXT NOT NULL,
                  version TEXT NOT NULL)"],
        ),
        table(
            "stats_pkg_state",
            &["CREATE TABLE stats_pkg_state
                 (datum TEXT NOT NULL,
                  suite TEXT NOT NULL,
                  untested INTEGER,
                  reproducible INTEGER,
                  unreproducible INTEGER,
                  FTBFS INTEGER,
                  other INTEGER,
                  PRIMARY KEY (datum))"],
        ),
        table(
            "stats_builds_per_day",
            &["CREATE TABLE stats_builds_per_day
                 (datum TEXT NOT NULL,
                  suite TEXT NOT NULL,
                  reproducible INTEGER,
                  unreproducible INTEGER,
                  FTBFS INTEGER,
                  other INTEGER,
                  PRIMARY KEY (datum))"],
        ),
        table(
            "stats_builds_age",
            &["CREATE TABLE stats_builds_age
                 (datum TEXT NOT NULL,
                  suite TEXT NOT NULL,
                  oldest_reproducible REAL,
                  oldest_unreproducible REAL,
                  oldest_FTBFS REAL,
                  PRIMARY KEY (datum))"],
        ),
        table(
            "stats_bugs",
            &["CREATE TABLE stats_bugs
                 (datum TEXT NOT NULL,
                  open_toolchain INTEGER,
                  done_toolchain INTEGER,
                  open_infrastructure INTEGER,
                  done_infrastructure INTEGER,
                  open_timestamps INTEGER,
                  done_timestamps INTEGER,
                  open_fileordering INTEGER,
                  done_fileordering INTEGER,
                  open_buildpath INTEGER,
                  done_buildpath INTEGER,
                  open_username INTEGER,
                  done_username INTEGER,
                  open_hostname INTEGER,
                  done_hostname INTEGER,
                  open_uname INTEGER,
                  done_uname INTEGER,
                  open_randomness INTEGER,
                  done_randomness INTEGER,
                  open_buildinfo INTEGER,
                  done_buildinfo INTEGER,
                  open_cpu INTEGER,
                  done_cpu INTEGER,
                  open_signatures INTEGER,
                  done_signatures INTEGER,
                  open_environment INTEGER,
                  one_environment INTEGER,
                  PRIMARY KEY (datum))"],
        ),
        table(
            "stats_notes",
            &["CREATE TABLE stats_notes
                 (datum TEXT NOT NULL,
                  packages_with_notes INTEGER,
                  PRIMARY KEY (datum))"],
        ),
        table(
            "stats_issues",
            &["CREATE TABLE stats_issues
                 (datum TEXT NOT NULL,
                  known_issues INTEGER,
                  PRIMARY KEY (datum))"],
        ),
        table(
            "stats_meta_pkg_state",
            &["CREATE TABLE stats_meta_pkg_state
                 (datum TEXT NOT NULL,
                  suite TEXT NOT NULL,
                  meta_pkg TEXT NOT NULL,
                  reproducible INTEGER,
                  unreproducible INTEGER,
                  FTBFS INTEGER,
                  other INTEGER,
                  PRIMARY KEY (datum, suite, meta_pkg))"],
        ),
    ]
}
