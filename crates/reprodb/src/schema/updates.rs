//! The versioned schema update batches.
//!
//! Append-only: a released batch is never edited, every schema change adds
//! a new, higher-numbered batch at the end. Batch N migrates the schema
//! from version N-1 to version N and is applied in a single transaction.
//!
//! All SQL targets PostgreSQL. Batches that predate the move away from the
//! embedded single-file store used the create/copy/drop/rename dance to
//! work around its missing ALTERs; those statements are valid PostgreSQL
//! and are kept as released.

use std::collections::BTreeMap;

/// All update batches, keyed by target version.
pub fn batches() -> BTreeMap<u32, Vec<String>> {
    let mut all: BTreeMap<u32, Vec<String>> = BTreeMap::new();
    {
        let mut add = |version: u32, statements: &[&str]| {
            all.insert(
                version,
                statements.iter().map(|s| s.to_string()).collect(),
            );
        };

        // the base schema is version 1
        add(1, &[]);

        // do a funny dance to add an id, suite and architecture values to
        // the sources table, then rework the dependent tables to join
        // against it instead of duplicating data
        add(
            2,
            &[
                "CREATE TABLE sources_new_tmp
                   (id INTEGER PRIMARY KEY,
                    name TEXT NOT NULL,
                    version TEXT NOT NULL,
                    suite TEXT,
                    architecture TEXT,
                    UNIQUE (name, suite, architecture))",
                "CREATE TABLE sources_new
                   (id INTEGER PRIMARY KEY,
                    name TEXT NOT NULL,
                    version TEXT NOT NULL,
                    suite TEXT NOT NULL,
                    architecture TEXT NOT NULL,
                    UNIQUE (name, suite, architecture))",
                "INSERT INTO sources_new_tmp (name, version) SELECT * FROM sources",
                "UPDATE sources_new_tmp SET suite='sid', architecture='amd64'",
                "INSERT INTO sources_new SELECT * FROM sources_new_tmp",
                "DROP TABLE sources_new_tmp",
                "DROP TABLE sources",
                "ALTER TABLE sources_new RENAME TO sources",
                "CREATE TABLE schedule
                   (id INTEGER PRIMARY KEY,
                    package_id INTEGER NOT NULL,
                    date_scheduled TEXT NOT NULL,
                    date_build_started TEXT NOT NULL,
                    save_artifacts INTEGER DEFAULT 0,
                    UNIQUE (package_id),
                    FOREIGN KEY(package_id) REFERENCES sources(id))",
                "INSERT INTO schedule (package_id, date_scheduled, date_build_started)
                   SELECT s.id, p.date_scheduled, p.date_build_started
                   FROM sources AS s JOIN sources_scheduled AS p ON s.name = p.name",
                "DROP TABLE sources_scheduled",
                "CREATE TABLE results
                   (id INTEGER PRIMARY KEY,
                    package_id INTEGER NOT NULL,
                    version TEXT NOT NULL,
                    status TEXT,
                    build_date TEXT,
                    build_duration TEXT DEFAULT '0',
                    UNIQUE (package_id),
                    FOREIGN KEY(package_id) REFERENCES sources(id))",
                "INSERT INTO results (package_id, version, status, build_date)
                   SELECT s.id, r.version, r.status, r.build_date
                   FROM sources AS s JOIN source_packages as r ON s.name = r.name",
                "DROP TABLE source_packages",
                "CREATE TABLE stats_build
                   (id INTEGER PRIMARY KEY,
                    name TEXT NOT NULL,
                    version TEXT NOT NULL,
                    suite TEXT NOT NULL,
                    architecture TEXT NOT NULL,
                    status TEXT NOT NULL,
                    build_date TEXT NOT NULL,
                    build_duration TEXT NOT NULL,
                    UNIQUE (name, version, suite, architecture, build_date))",
            ],
        );

        // add columns to stats_bugs for new usertag umask
        add(
            3,
            &[
                "ALTER TABLE stats_bugs ADD COLUMN open_umask INTEGER",
                "ALTER TABLE stats_bugs ADD COLUMN done_umask INTEGER",
            ],
        );

        // stats_pkg_state needs (datum, suite) as primary key
        add(
            4,
            &[
                "CREATE TABLE stats_pkg_state_tmp
                   (datum TEXT NOT NULL,
                    suite TEXT NOT NULL,
                    untested INTEGER,
                    reproducible INTEGER,
                    unreproducible INTEGER,
                    FTBFS INTEGER,
                    other INTEGER,
                    PRIMARY KEY (datum, suite))",
                "INSERT INTO stats_pkg_state_tmp (datum, suite, untested,
                    reproducible, unreproducible, FTBFS, other)
                    SELECT datum, suite, untested, reproducible, unreproducible,
                    FTBFS, other FROM stats_pkg_state",
                "DROP TABLE stats_pkg_state",
                "ALTER TABLE stats_pkg_state_tmp RENAME TO stats_pkg_state",
            ],
        );

        // stats_builds_per_day needs (datum, suite) as primary key
        add(
            5,
            &[
                "CREATE TABLE stats_builds_per_day_tmp
                   (datum TEXT NOT NULL,
                    suite TEXT NOT NULL,
                    reproducible INTEGER,
                    unreproducible INTEGER,
                    FTBFS INTEGER,
                    other INTEGER,
                    PRIMARY KEY (datum, suite))",
                "INSERT INTO stats_builds_per_day_tmp (datum, suite,
                    reproducible, unreproducible, FTBFS, other)
                    SELECT datum, suite, reproducible, unreproducible,
                    FTBFS, other FROM stats_builds_per_day",
                "DROP TABLE stats_builds_per_day",
                "ALTER TABLE stats_builds_per_day_tmp RENAME TO stats_builds_per_day",
            ],
        );

        // stats_builds_age needs (datum, suite) as primary key
        add(
            6,
            &[
                "CREATE TABLE stats_builds_age_tmp
                   (datum TEXT NOT NULL,
                    suite TEXT NOT NULL,
                    oldest_reproducible REAL,
                    oldest_unreproducible REAL,
                    oldest_FTBFS REAL,
                    PRIMARY KEY (datum, suite))",
                "INSERT INTO stats_builds_age_tmp (datum, suite,
                    oldest_reproducible, oldest_unreproducible, oldest_FTBFS)
                    SELECT datum, suite, oldest_reproducible, oldest_unreproducible,
                    oldest_FTBFS FROM stats_builds_age",
                "DROP TABLE stats_builds_age",
                "ALTER TABLE stats_builds_age_tmp RENAME TO stats_builds_age",
            ],
        );

        // change build_duration field in results and stats_build from str to int
        add(
            7,
            &[
                "CREATE TABLE stats_build_tmp
                   (id INTEGER PRIMARY KEY,
                    name TEXT NOT NULL,
                    version TEXT NOT NULL,
                    suite TEXT NOT NULL,
                    architecture TEXT NOT NULL,
                    status TEXT NOT NULL,
                    build_date TEXT NOT NULL,
                    build_duration INTEGER NOT NULL,
                    UNIQUE (name, version, suite, architecture, build_date))",
                "INSERT INTO stats_build_tmp
                    SELECT id, name, version, suite, architecture, status, build_date,
                    CAST (build_duration AS INTEGER) FROM stats_build",
                "DROP TABLE stats_build",
                "ALTER TABLE stats_build_tmp RENAME TO stats_build",
                "CREATE TABLE results_tmp
                   (id INTEGER PRIMARY KEY,
                    package_id INTEGER NOT NULL,
                    version TEXT NOT NULL,
                    status TEXT,
                    build_date TEXT,
                    build_duration INTEGER DEFAULT '0',
                    UNIQUE (package_id),
                    FOREIGN KEY(package_id) REFERENCES sources(id))",
                "INSERT INTO results_tmp
                    SELECT id, package_id, version, status,
                    build_date, CAST (build_duration AS INTEGER) FROM results",
                "DROP TABLE results",
                "ALTER TABLE results_tmp RENAME TO results",
            ],
        );

        // add default value to stats_bugs to get a full 'done vs open bugs' graph
        add(
            8,
            &[
                "CREATE TABLE stats_bugs_tmp
                   (datum TEXT NOT NULL,
                    open_toolchain INTEGER DEFAULT '0',
                    done_toolchain INTEGER DEFAULT '0',
                    open_infrastructure INTEGER DEFAULT '0',
                    done_infrastructure INTEGER DEFAULT '0',
                    open_timestamps INTEGER DEFAULT '0',
                    done_timestamps INTEGER DEFAULT '0',
                    open_fileordering INTEGER DEFAULT '0',
                    done_fileordering INTEGER DEFAULT '0',
                    open_buildpath INTEGER DEFAULT '0',
                    done_buildpath INTEGER DEFAULT '0',
                    open_username INTEGER DEFAULT '0',
                    done_username INTEGER DEFAULT '0',
                    open_hostname INTEGER DEFAULT '0',
                    done_hostname INTEGER DEFAULT '0',
                    open_uname INTEGER DEFAULT '0',
                    done_uname INTEGER DEFAULT '0',
                    open_randomness INTEGER DEFAULT '0',
                    done_randomness INTEGER DEFAULT '0',
                    open_buildinfo INTEGER DEFAULT '0',
                    done_buildinfo INTEGER DEFAULT '0',
                    open_cpu INTEGER DEFAULT '0',
                    done_cpu INTEGER DEFAULT '0',
                    open_signatures INTEGER DEFAULT '0',
                    done_signatures INTEGER DEFAULT '0',
                    open_environment INTEGER DEFAULT '0',
                    done_environment INTEGER DEFAULT '0',
                    open_umask INTEGER DEFAULT '0',
                    done_umask INTEGER DEFAULT '0',
                    PRIMARY KEY (datum))",
                "INSERT INTO stats_bugs_tmp SELECT * FROM stats_bugs",
                "DROP TABLE stats_bugs",
                "ALTER TABLE stats_bugs_tmp RENAME TO stats_bugs",
            ],
        );

        // rename 'sid' to 'unstable'
        add(
            9,
            &[
                "UPDATE sources SET suite = 'unstable' WHERE suite = 'sid'",
                "UPDATE stats_build SET suite = 'unstable' WHERE suite = 'sid'",
                "UPDATE stats_pkg_state SET suite = 'unstable' WHERE suite = 'sid'",
                "UPDATE stats_builds_per_day SET suite = 'unstable' WHERE suite = 'sid'",
                "UPDATE stats_builds_age SET suite = 'unstable' WHERE suite = 'sid'",
                "UPDATE stats_meta_pkg_state SET suite = 'unstable' WHERE suite = 'sid'",
            ],
        );

        // add the notes and issues tables
        add(
            10,
            &[
                "CREATE TABLE notes (
                    package_id INTEGER,
                    version TEXT NOT NULL,
                    issues TEXT,
                    bugs TEXT,
                    comments TEXT,
                    PRIMARY KEY (package_id),
                    FOREIGN KEY(package_id) REFERENCES sources(id))",
                "CREATE TABLE issues (
                    name TEXT NOT NULL,
                    description TEXT NOT NULL,
                    url TEXT,
                    PRIMARY KEY (name))",
            ],
        );

        // table with removed packages, to enable the maintenance job to do clean up
        add(
            11,
            &["CREATE TABLE removed_packages (
                 name TEXT NOT NULL,
                 suite TEXT NOT NULL,
                 architecture TEXT NOT NULL,
                 PRIMARY KEY (name, suite, architecture))"],
        );

        // refactor the artifacts handling, splitting artifacts saving from
        // IRC notification
        add(12, &["ALTER TABLE schedule ADD COLUMN notify TEXT"]);

        // record manual scheduling done, to be able to limit people
        add(
            13,
            &[
                "CREATE TABLE manual_scheduler (
                    id INTEGER PRIMARY KEY,
                    package_id INTEGER NOT NULL,
                    requester TEXT NOT NULL,
                    date_request INTEGER NOT NULL)",
                "ALTER TABLE schedule ADD COLUMN scheduler TEXT",
            ],
        );

        // column to enable mail notification to maintainers
        add(
            14,
            &["ALTER TABLE sources ADD COLUMN notify_maintainer INTEGER NOT NULL DEFAULT 0"],
        );

        // add columns to stats_bugs for new usertag ftbfs
        add(
            15,
            &[
                "ALTER TABLE stats_bugs ADD COLUMN open_ftbfs INTEGER",
                "ALTER TABLE stats_bugs ADD COLUMN done_ftbfs INTEGER",
            ],
        );

        // add default value to stats_bugs.(open|done)_ftbfs to get a full
        // 'done vs open bugs' graph
        add(
            16,
            &[
                "CREATE TABLE stats_bugs_tmp
                   (datum TEXT NOT NULL,
                    open_toolchain INTEGER DEFAULT '0',
                    done_toolchain INTEGER DEFAULT '0',
                    open_infrastructure INTEGER DEFAULT '0',
                    done_infrastructure INTEGER DEFAULT '0',
                    open_timestamps INTEGER DEFAULT '0',
                    done_timestamps INTEGER DEFAULT '0',
                    open_fileordering INTEGER DEFAULT '0',
                    done_fileordering INTEGER DEFAULT '0',
                    open_buildpath INTEGER DEFAULT '0',
                    done_buildpath INTEGER DEFAULT '0',
                    open_username INTEGER DEFAULT '0',
                    done_username INTEGER DEFAULT '0',
                    open_hostname INTEGER DEFAULT '0',
                    done_hostname INTEGER DEFAULT '0',
                    open_uname INTEGER DEFAULT '0',
                    done_uname INTEGER DEFAULT '0',
                    open_randomness INTEGER DEFAULT '0',
                    done_randomness INTEGER DEFAULT '0',
                    open_buildinfo INTEGER DEFAULT '0',
                    done_buildinfo INTEGER DEFAULT '0',
                    open_cpu INTEGER DEFAULT '0',
                    done_cpu INTEGER DEFAULT '0',
                    open_signatures INTEGER DEFAULT '0',
                    done_signatures INTEGER DEFAULT '0',
                    open_environment INTEGER DEFAULT '0',
                    done_environment INTEGER DEFAULT '0',
                    open_umask INTEGER DEFAULT '0',
                    done_umask INTEGER DEFAULT '0',
                    open_ftbfs INTEGER DEFAULT '0',
                    done_ftbfs INTEGER DEFAULT '0',
                    PRIMARY KEY (datum))",
                "INSERT INTO stats_bugs_tmp SELECT * FROM stats_bugs",
                "DROP TABLE stats_bugs",
                "ALTER TABLE stats_bugs_tmp RENAME TO stats_bugs",
            ],
        );

        // add column to save which builders builds what
        add(
            17,
            &[
                "ALTER TABLE schedule ADD COLUMN builder TEXT",
                "ALTER TABLE results ADD COLUMN builder TEXT NOT NULL DEFAULT ''",
                "ALTER TABLE stats_build ADD COLUMN builder TEXT NOT NULL DEFAULT ''",
            ],
        );

        // add columns to stats_bugs for new usertag locale
        add(
            18,
            &[
                "ALTER TABLE stats_bugs ADD COLUMN open_locale INTEGER DEFAULT 0",
                "ALTER TABLE stats_bugs ADD COLUMN done_locale INTEGER DEFAULT 0",
            ],
        );

        // add column architecture to stats_pkg_state, stats_builds_per_day
        // and stats_builds_age tables and set previous values to amd64
        add(
            19,
            &[
                "ALTER TABLE stats_pkg_state ADD COLUMN architecture TEXT NOT NULL DEFAULT 'amd64'",
                "ALTER TABLE stats_builds_per_day ADD COLUMN architecture TEXT NOT NULL DEFAULT 'amd64'",
                "ALTER TABLE stats_builds_age ADD COLUMN architecture TEXT NOT NULL DEFAULT 'amd64'",
            ],
        );

        // use (datum, suite, architecture) as primary key for stats_pkg_state
        add(
            20,
            &[
                "CREATE TABLE stats_pkg_state_tmp
                   (datum TEXT NOT NULL,
                    suite TEXT NOT NULL,
                    architecture TEXT NOT NULL,
                    untested INTEGER,
                    reproducible INTEGER,
                    unreproducible INTEGER,
                    FTBFS INTEGER,
                    other INTEGER,
                    PRIMARY KEY (datum, suite, architecture))",
                "INSERT INTO stats_pkg_state_tmp (datum, suite, architecture, untested,
                    reproducible, unreproducible, FTBFS, other)
                    SELECT datum, suite, architecture, untested, reproducible, unreproducible,
                    FTBFS, other FROM stats_pkg_state",
                "DROP TABLE stats_pkg_state",
                "ALTER TABLE stats_pkg_state_tmp RENAME TO stats_pkg_state",
            ],
        );

        // use (datum, suite, architecture) as primary key for stats_builds_per_day
        add(
            21,
            &[
                "CREATE TABLE stats_builds_per_day_tmp
                   (datum TEXT NOT NULL,
                    suite TEXT NOT NULL,
                    architecture TEXT NOT NULL,
                    reproducible INTEGER,
                    unreproducible INTEGER,
                    FTBFS INTEGER,
                    other INTEGER,
                    PRIMARY KEY (datum, suite, architecture))",
                "INSERT INTO stats_builds_per_day_tmp (datum, suite, architecture,
                    reproducible, unreproducible, FTBFS, other)
                    SELECT datum, suite, architecture, reproducible, unreproducible,
                    FTBFS, other FROM stats_builds_per_day",
                "DROP TABLE stats_builds_per_day",
                "ALTER TABLE stats_builds_per_day_tmp RENAME TO stats_builds_per_day",
            ],
        );

        // use (datum, suite, architecture) as primary key for stats_builds_age
        add(
            22,
            &[
                "CREATE TABLE stats_builds_age_tmp
                   (datum TEXT NOT NULL,
                    suite TEXT NOT NULL,
                    architecture TEXT NOT NULL,
                    oldest_reproducible REAL,
                    oldest_unreproducible REAL,
                    oldest_FTBFS REAL,
                    PRIMARY KEY (datum, suite, architecture))",
                "INSERT INTO stats_builds_age_tmp (datum, suite, architecture,
                    oldest_reproducible, oldest_unreproducible, oldest_FTBFS)
                    SELECT datum, suite, architecture, oldest_reproducible, oldest_unreproducible,
                    oldest_FTBFS FROM stats_builds_age",
                "DROP TABLE stats_builds_age",
                "ALTER TABLE stats_builds_age_tmp RENAME TO stats_builds_age",
            ],
        );

        // save which builders built a package and change the name of the
        // field keeping the job name
        add(
            23,
            &[
                "CREATE TABLE stats_build_tmp
                    (id INTEGER PRIMARY KEY,
                     name TEXT NOT NULL,
                     version TEXT NOT NULL,
                     suite TEXT NOT NULL,
                     architecture TEXT NOT NULL,
                     status TEXT NOT NULL,
                     build_date TEXT NOT NULL,
                     build_duration TEXT NOT NULL,
                     node1 TEXT NOT NULL DEFAULT '',
                     node2 TEXT NOT NULL DEFAULT '',
                     job TEXT NOT NULL,
                     UNIQUE (name, version, suite, architecture, build_date))",
                "INSERT INTO stats_build_tmp (id, name, version, suite, architecture,
                        status, build_date, build_duration, job)
                   SELECT id, name, version, suite, architecture, status, build_date,
                        build_duration, builder FROM stats_build",
                "DROP TABLE stats_build",
                "ALTER TABLE stats_build_tmp RENAME TO stats_build",
            ],
        );

        // the same as #23 but for the results table
        add(
            24,
            &[
                "CREATE TABLE results_tmp
                   (id INTEGER PRIMARY KEY,
                    package_id INTEGER NOT NULL,
                    version TEXT NOT NULL,
                    status TEXT NOT NULL,
                    build_date TEXT NOT NULL,
                    build_duration INTEGER DEFAULT 0,
                    node1 TEXT,
                    node2 TEXT,
                    job TEXT NOT NULL,
                    UNIQUE (package_id),
                    FOREIGN KEY(package_id) REFERENCES sources(id))",
                "INSERT INTO results_tmp (id, package_id, version, status,
                        build_date, build_duration, job)
                   SELECT id, package_id, version, status, build_date, build_duration,
                        builder FROM results",
                "DROP TABLE results",
                "ALTER TABLE results_tmp RENAME TO results",
            ],
        );

        // rename the builder column also in the schedule table
        add(
            25,
            &[
                "CREATE TABLE schedule_tmp
                   (id INTEGER PRIMARY KEY,
                    package_id INTEGER NOT NULL,
                    date_scheduled TEXT NOT NULL,
                    scheduler TEXT,
                    date_build_started TEXT,
                    job TEXT,
                    notify TEXT NOT NULL DEFAULT '',
                    save_artifacts INTEGER DEFAULT 0,
                    UNIQUE (package_id),
                    FOREIGN KEY(package_id) REFERENCES sources(id))",
                "UPDATE schedule SET notify = '' WHERE notify IS NULL",
                "INSERT INTO schedule_tmp (id, package_id, date_scheduled, scheduler,
                        date_build_started, job, notify, save_artifacts)
                   SELECT id, package_id, date_scheduled, scheduler,
                        date_build_started, builder, notify, save_artifacts
                   FROM schedule",
                "DROP TABLE schedule",
                "ALTER TABLE schedule_tmp RENAME TO schedule",
            ],
        );

        // add a column to the schedule table to save the schedule message
        add(
            26,
            &[
                "ALTER TABLE schedule ADD COLUMN message TEXT",
                "ALTER TABLE stats_build ADD COLUMN schedule_message TEXT NOT NULL DEFAULT ''",
            ],
        );

        // add column architecture to stats_meta_pkg_state and set previous
        // values to amd64
        add(
            27,
            &["ALTER TABLE stats_meta_pkg_state ADD COLUMN architecture TEXT NOT NULL DEFAULT 'amd64'"],
        );

        // use (datum, suite, architecture, meta_pkg) as primary key for
        // stats_meta_pkg_state
        add(
            28,
            &[
                "CREATE TABLE stats_meta_pkg_state_tmp
                   (datum TEXT NOT NULL,
                    suite TEXT NOT NULL,
                    architecture TEXT NOT NULL,
                    meta_pkg TEXT NOT NULL,
                    reproducible INTEGER,
                    unreproducible INTEGER,
                    FTBFS INTEGER,
                    other INTEGER,
                    PRIMARY KEY (datum, suite, architecture, meta_pkg))",
                "INSERT INTO stats_meta_pkg_state_tmp (datum, suite, architecture, meta_pkg,
                    reproducible, unreproducible, FTBFS, other)
                    SELECT datum, suite, architecture, meta_pkg, reproducible, unreproducible,
                    FTBFS, other FROM stats_meta_pkg_state",
                "DROP TABLE stats_meta_pkg_state",
                "ALTER TABLE stats_meta_pkg_state_tmp RENAME TO stats_meta_pkg_state",
            ],
        );

        // add auto incrementing to the id columns of some tables
        add(
            29,
            &[
                "CREATE SEQUENCE schedule_id_seq",
                "ALTER TABLE schedule ALTER id SET DEFAULT NEXTVAL('schedule_id_seq')",
                "CREATE SEQUENCE manual_scheduler_id_seq",
                "ALTER TABLE manual_scheduler ALTER id SET DEFAULT
                    NEXTVAL('manual_scheduler_id_seq')",
                "CREATE SEQUENCE sources_id_seq",
                "ALTER TABLE sources ALTER id SET DEFAULT NEXTVAL('sources_id_seq')",
                "CREATE SEQUENCE stats_build_id_seq",
                "ALTER TABLE stats_build ALTER id SET DEFAULT
                    NEXTVAL('stats_build_id_seq')",
                "CREATE SEQUENCE results_id_seq",
                "ALTER TABLE results ALTER id SET DEFAULT NEXTVAL('results_id_seq')",
            ],
        );

        // add new table to track diffoscope breakage
        add(
            30,
            &["CREATE TABLE stats_breakages
                 (datum TEXT,
                  diffoscope_timeouts INTEGER,
                  diffoscope_crashes INTEGER,
                  PRIMARY KEY (datum))"],
        );

        // rename the 'testing' suite into 'stretch'
        add(
            31,
            &[
                "UPDATE sources SET suite='stretch' WHERE suite='testing'",
                "UPDATE stats_pkg_state SET suite='stretch' WHERE suite='testing'",
                "UPDATE stats_builds_per_day SET suite='stretch' WHERE suite='testing'",
                "UPDATE stats_builds_age SET suite='stretch' WHERE suite='testing'",
                "UPDATE stats_meta_pkg_state SET suite='stretch' WHERE suite='testing'",
                "UPDATE stats_build SET suite='stretch' WHERE suite='testing'",
            ],
        );

        // copy stretch packages (including results) in buster
        add(
            32,
            &[
                "INSERT INTO sources (name, version, suite, architecture, notify_maintainer)
                    SELECT name, version, 'buster', architecture, notify_maintainer
                    FROM sources
                    WHERE suite = 'stretch'",
                "WITH buster AS (
                        SELECT id, name, suite, architecture, version
                        FROM sources WHERE suite = 'buster'),
                    sr AS (
                        SELECT s.name, s.architecture, r.id, r.version, r.status,
                            r.build_date, r.build_duration, r.node1, r.node2, r.job
                        FROM sources AS s JOIN results AS r ON s.id=r.package_id
                        WHERE s.suite = 'stretch')
                    INSERT INTO results (package_id, version, status, build_date,
                            build_duration, node1, node2, job)
                        SELECT b.id, sr.version, sr.status, sr.build_date,
                            sr.build_duration, sr.node1, sr.node2, sr.job
                        FROM buster AS b JOIN sr ON b.name=sr.name
                            AND b.architecture=sr.architecture",
            ],
        );

        // drop the message columns, they are not actually needed
        add(
            33,
            &[
                "ALTER TABLE schedule DROP COLUMN message",
                "ALTER TABLE stats_build DROP COLUMN schedule_message",
            ],
        );

        // rename status "not for us" to "NFU"
        add(
            34,
            &[
                "UPDATE results SET status='NFU' WHERE status='not for us'",
                "UPDATE stats_build SET status='NFU' WHERE status='not for us'",
            ],
        );

        // rename status "unreproducible" to "FTBR"
        add(
            35,
            &[
                "UPDATE results SET status='FTBR' WHERE status='unreproducible'",
                "UPDATE stats_build SET status='FTBR' WHERE status='unreproducible'",
                "ALTER TABLE stats_pkg_state RENAME COLUMN unreproducible to FTBR",
                "ALTER TABLE stats_meta_pkg_state RENAME COLUMN unreproducible to FTBR",
                "ALTER TABLE stats_builds_per_day RENAME COLUMN unreproducible to FTBR",
                "ALTER TABLE stats_builds_age RENAME COLUMN oldest_unreproducible to oldest_FTBR",
            ],
        );

        // rename status "404" to "E404"
        add(
            36,
            &[
                "UPDATE results SET status='E404' WHERE status='404'",
                "UPDATE stats_build SET status='E404' WHERE status='404'",
            ],
        );

        // change the data type in the stats_build.build_date column
        add(
            37,
            &["ALTER TABLE stats_build ALTER COLUMN build_date SET DATA TYPE timestamp
                 USING build_date::timestamp"],
        );

        // add a distribution field to the sources tables
        add(
            38,
            &[
                "CREATE TABLE distributions (
                    id SERIAL PRIMARY KEY,
                    name VARCHAR)",
                "INSERT INTO distributions (name) VALUES ('debian')",
                "ALTER TABLE sources
                    ADD COLUMN distribution INTEGER DEFAULT 1
                    REFERENCES distributions(id)",
                "ALTER TABLE stats_build
                    ADD COLUMN distribution INTEGER DEFAULT 1
                    REFERENCES distributions(id)",
            ],
        );

        // fix build_duration datatype
        add(
            39,
            &["ALTER TABLE stats_build ALTER COLUMN build_duration SET DATA TYPE integer
                 USING build_duration::integer"],
        );

        // add some new distributions
        add(
            40,
            &["INSERT INTO distributions (name) VALUES ('opensuse'), ('archlinux'), ('alpine')"],
        );

        // mark archlinux packages as archlinux packages
        add(
            41,
            &[
                "UPDATE sources SET distribution=(
                    SELECT id FROM distributions WHERE name='archlinux')
                   WHERE suite LIKE 'archlinux_%'",
                "UPDATE stats_build SET distribution=(
                    SELECT id FROM distributions WHERE name='archlinux')
                   WHERE suite LIKE 'archlinux_%'",
            ],
        );

        // add OpenWrt
        add(42, &["INSERT INTO distributions (name) VALUES ('openwrt')"]);

        // Arch Linux should use the same stati as Debian
        add(
            43,
            &[
                "UPDATE results SET status='reproducible' WHERE status='GOOD'",
                "UPDATE results SET status='blacklisted' WHERE status='BLACKLISTED'",
            ],
        );

        // copy buster packages (including results) in bullseye
        add(
            44,
            &[
                "INSERT INTO sources (name, version, suite, architecture, notify_maintainer, distribution)
                    SELECT name, version, 'bullseye', architecture, notify_maintainer, distribution
                    FROM sources
                    WHERE suite = 'buster'",
                "WITH bullseye AS (
                        SELECT id, name, suite, architecture, version
                        FROM sources WHERE suite = 'bullseye'),
                    sr AS (
                        SELECT s.name, s.architecture, r.version, r.status,
                            r.build_date, r.build_duration, r.node1, r.node2, r.job
                        FROM sources AS s JOIN results AS r ON s.id=r.package_id
                        WHERE s.suite = 'buster')
                    INSERT INTO results (package_id, version, status, build_date,
                            build_duration, node1, node2, job)
                        SELECT b.id, sr.version, sr.status, sr.build_date,
                            sr.build_duration, sr.node1, sr.node2, sr.job
                        FROM bullseye AS b JOIN sr ON b.name=sr.name
                            AND b.architecture=sr.architecture",
            ],
        );

        // fixup #43
        add(
            45,
            &[
                "UPDATE stats_build SET status='reproducible' WHERE status='GOOD'",
                "UPDATE stats_build SET status='blacklisted' WHERE status='BLACKLISTED'",
            ],
        );

        // create a build_type field
        add(
            46,
            &[
                "CREATE TYPE build_type AS ENUM ('verification', 'ci_build')",
                "ALTER TABLE results ADD COLUMN build_type build_type DEFAULT 'ci_build' NOT NULL",
                "ALTER TABLE stats_build ADD COLUMN build_type build_type DEFAULT 'ci_build' NOT NULL",
                "ALTER TABLE schedule ADD COLUMN build_type build_type",
                "UPDATE schedule SET build_type='ci_build'",
                "ALTER TABLE schedule ALTER COLUMN build_type SET NOT NULL",
            ],
        );

        // turn timestamps into real timestamps
        add(
            47,
            &[
                "ALTER TABLE results ALTER COLUMN build_date TYPE timestamp without time zone
                    USING to_timestamp(build_date, 'YYYY-MM-DD HH24:MI:SS')",
                "ALTER TABLE schedule ALTER COLUMN date_scheduled TYPE timestamp without time zone
                    USING to_timestamp(date_scheduled, 'YYYY-MM-DD HH24:MI:SS')",
                "ALTER TABLE stats_breakages ALTER COLUMN datum TYPE date
                    USING to_date(datum, 'YYYY-MM-DD')",
                "ALTER TABLE stats_bugs ALTER COLUMN datum TYPE date
                    USING to_date(datum, 'YYYY-MM-DD')",
                "ALTER TABLE stats_builds_age ALTER COLUMN datum TYPE date
                    USING to_date(datum, 'YYYY-MM-DD')",
                "ALTER TABLE stats_builds_per_day ALTER COLUMN datum TYPE date
                    USING to_date(datum, 'YYYY-MM-DD')",
                "ALTER TABLE stats_issues ALTER COLUMN datum TYPE date
                    USING to_date(datum, 'YYYY-MM-DD')",
                "ALTER TABLE stats_meta_pkg_state ALTER COLUMN datum TYPE date
                    USING to_date(datum, 'YYYY-MM-DD')",
                "ALTER TABLE stats_notes ALTER COLUMN datum TYPE date
                    USING to_date(datum, 'YYYY-MM-DD')",
                "ALTER TABLE stats_pkg_state ALTER COLUMN datum TYPE date
                    USING to_date(datum, 'YYYY-MM-DD')",
            ],
        );

        // normalize archlinux's suite names
        add(
            48,
            &[
                "UPDATE sources SET suite='core' WHERE suite='archlinux_core'",
                "UPDATE sources SET suite='extra' WHERE suite='archlinux_extra'",
                "UPDATE sources SET suite='community' WHERE suite='archlinux_community'",
                "UPDATE sources SET suite='multilib' WHERE suite='archlinux_multilib'",
                "UPDATE stats_build SET suite='core' WHERE suite='archlinux_core'",
                "UPDATE stats_build SET suite='extra' WHERE suite='archlinux_extra'",
                "UPDATE stats_build SET suite='community' WHERE suite='archlinux_community'",
                "UPDATE stats_build SET suite='multilib' WHERE suite='archlinux_multilib'",
            ],
        );

        // create a dsources view
        add(
            49,
            &["CREATE VIEW dsources AS
                 SELECT s.id AS package_id, s.name, s.version, s.suite,
                     s.architecture, s.notify_maintainer, d.name AS distribution
                 FROM sources s JOIN distributions d on s.distribution=d.id"],
        );
    }

    all
}
