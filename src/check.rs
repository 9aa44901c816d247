//! End-to-end check against a live PostgreSQL server.
//!
//! One column per well-known type is created in a temporary table. Sample
//! values are written three ways (static `Pb` parameters, registry-dispatched
//! parameters, and NULLs) and every column is read back both statically and
//! through the registry.

use std::any::Any;

use anyhow::{bail, Context, Result};
use protobuf::well_known_types::timestamp::Timestamp;
use protobuf::well_known_types::wrappers::{
    BoolValue, BytesValue, DoubleValue, FloatValue, Int32Value, Int64Value, StringValue,
    UInt32Value, UInt64Value,
};
use tokio_postgres::{types::ToSql, Client, NoTls, Row};
use tracing::{debug, error, info};
use wkt_types::{
    carrier, scan_column, ConversionRegistry, Pb, PostgreSQLDdl, RegistryParam, ToDdl,
    WellKnownType, WktKind,
};

use crate::Config;

/// Outcome of a successful [`run_check`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CheckReport {
    /// Rows written and read back.
    pub rows: usize,
    /// Individual column reads that matched.
    pub columns: usize,
}

/// One line per registered conversion: message name, column type, Rust type.
pub fn describe(registry: &ConversionRegistry) -> Vec<String> {
    let ddl = PostgreSQLDdl;
    registry
        .iter()
        .map(|c| {
            format!(
                "{:<28} {:<16} {}",
                c.kind.full_name(),
                ddl.to_ddl(&c.kind),
                c.rust_type
            )
        })
        .collect()
}

/// Column layout of the check table, in [`WktKind::ALL`] order.
pub fn check_columns() -> Vec<(String, WktKind, bool)> {
    WktKind::ALL
        .iter()
        .map(|kind| (format!("{kind:?}").to_lowercase(), *kind, true))
        .collect()
}

struct Samples {
    timestamp: Timestamp,
    double: DoubleValue,
    float: FloatValue,
    int64: Int64Value,
    uint64: UInt64Value,
    int32: Int32Value,
    uint32: UInt32Value,
    flag: BoolValue,
    text: StringValue,
    blob: BytesValue,
}

impl Samples {
    fn new() -> Self {
        let mut timestamp = Timestamp::new();
        timestamp.seconds = 1_700_000_000;
        timestamp.nanos = 123_456_000;

        Samples {
            timestamp,
            double: carrier::double(std::f64::consts::PI),
            float: carrier::float(-0.5),
            int64: carrier::int64(i64::MIN),
            uint64: carrier::uint64(u64::MAX),
            int32: carrier::int32(-42),
            uint32: carrier::uint32(u32::MAX),
            flag: carrier::bool(true),
            text: carrier::string("well-known".to_string()),
            blob: carrier::bytes(vec![0xde, 0xad, 0xbe, 0xef]),
        }
    }

    fn values(&self) -> [&(dyn Any + Send + Sync); 10] {
        [
            &self.timestamp,
            &self.double,
            &self.float,
            &self.int64,
            &self.uint64,
            &self.int32,
            &self.uint32,
            &self.flag,
            &self.text,
            &self.blob,
        ]
    }
}

/// Round-trip every well-known type through the server in `config`.
pub async fn run_check(config: &Config) -> Result<CheckReport> {
    let registry = ConversionRegistry::with_well_known_types(&config.registry_options());

    let (client, connection) = tokio_postgres::connect(&config.connection_string, NoTls)
        .await
        .context("Failed to connect to PostgreSQL")?;

    tokio::spawn(async move {
        if let Err(e) = connection.await {
            error!("PostgreSQL connection error: {e}");
        }
    });

    let ddl = PostgreSQLDdl;
    let columns = check_columns();
    let names: Vec<String> = columns.iter().map(|(name, _, _)| name.clone()).collect();

    client
        .batch_execute(&ddl.to_create_temp_table(&config.table, &columns))
        .await
        .with_context(|| format!("Failed to create table {}", config.table))?;
    info!("Created temporary table {}", config.table);

    let insert = ddl.to_insert(&config.table, &names);
    let select = ddl.to_select(&config.table, &names);
    let samples = Samples::new();
    let mut report = CheckReport::default();

    // Static parameters
    {
        let timestamp = Pb(samples.timestamp.clone());
        let double = Pb(samples.double.clone());
        let float = Pb(samples.float.clone());
        let int64 = Pb(samples.int64.clone());
        let uint64 = Pb(samples.uint64.clone());
        let int32 = Pb(samples.int32.clone());
        let uint32 = Pb(samples.uint32.clone());
        let flag = Pb(samples.flag.clone());
        let text = Pb(samples.text.clone());
        let blob = Pb(samples.blob.clone());
        let params: [&(dyn ToSql + Sync); 10] = [
            &timestamp, &double, &float, &int64, &uint64, &int32, &uint32, &flag, &text, &blob,
        ];
        client
            .execute(&insert, &params)
            .await
            .context("Failed to insert static sample row")?;
    }
    report.columns += verify_pass(&client, &registry, &select, Some(&samples), "static").await?;
    report.rows += 1;
    clear(&client, &config.table).await?;

    // Registry-dispatched parameters
    {
        let params: Vec<RegistryParam<'_>> = samples
            .values()
            .into_iter()
            .map(|value| RegistryParam::new(&registry, value))
            .collect();
        let refs: Vec<&(dyn ToSql + Sync)> = params
            .iter()
            .map(|p| p as &(dyn ToSql + Sync))
            .collect();
        client
            .execute(&insert, &refs)
            .await
            .context("Failed to insert registry sample row")?;
    }
    report.columns += verify_pass(&client, &registry, &select, Some(&samples), "registry").await?;
    report.rows += 1;
    clear(&client, &config.table).await?;

    // NULLs
    {
        let timestamp: Option<Pb<Timestamp>> = None;
        let double: Option<Pb<DoubleValue>> = None;
        let float: Option<Pb<FloatValue>> = None;
        let int64: Option<Pb<Int64Value>> = None;
        let uint64: Option<Pb<UInt64Value>> = None;
        let int32: Option<Pb<Int32Value>> = None;
        let uint32: Option<Pb<UInt32Value>> = None;
        let flag: Option<Pb<BoolValue>> = None;
        let text: Option<Pb<StringValue>> = None;
        let blob: Option<Pb<BytesValue>> = None;
        let params: [&(dyn ToSql + Sync); 10] = [
            &timestamp, &double, &float, &int64, &uint64, &int32, &uint32, &flag, &text, &blob,
        ];
        client
            .execute(&insert, &params)
            .await
            .context("Failed to insert NULL row")?;
    }
    report.columns += verify_pass(&client, &registry, &select, None, "null").await?;
    report.rows += 1;

    info!(
        "Check complete: {} rows, {} column reads matched",
        report.rows, report.columns
    );
    Ok(report)
}

async fn clear(client: &Client, table: &str) -> Result<()> {
    client
        .batch_execute(&format!("TRUNCATE \"{table}\""))
        .await
        .with_context(|| format!("Failed to truncate {table}"))
}

async fn verify_pass(
    client: &Client,
    registry: &ConversionRegistry,
    select: &str,
    expected: Option<&Samples>,
    pass: &str,
) -> Result<usize> {
    let row = client
        .query_one(select, &[])
        .await
        .with_context(|| format!("Failed to read back {pass} row"))?;

    verify_column(registry, &row, 0, expected.map(|s| &s.timestamp))?;
    verify_column(registry, &row, 1, expected.map(|s| &s.double))?;
    verify_column(registry, &row, 2, expected.map(|s| &s.float))?;
    verify_column(registry, &row, 3, expected.map(|s| &s.int64))?;
    verify_column(registry, &row, 4, expected.map(|s| &s.uint64))?;
    verify_column(registry, &row, 5, expected.map(|s| &s.int32))?;
    verify_column(registry, &row, 6, expected.map(|s| &s.uint32))?;
    verify_column(registry, &row, 7, expected.map(|s| &s.flag))?;
    verify_column(registry, &row, 8, expected.map(|s| &s.text))?;
    verify_column(registry, &row, 9, expected.map(|s| &s.blob))?;

    info!("{pass} pass matched");
    // Each column is read twice
    Ok(2 * WktKind::ALL.len())
}

fn verify_column<W: WellKnownType>(
    registry: &ConversionRegistry,
    row: &Row,
    idx: usize,
    expected: Option<&W>,
) -> Result<()> {
    let kind = W::KIND;
    let expected = expected.cloned();

    let read: Option<Pb<W>> = row
        .try_get(idx)
        .with_context(|| format!("Failed to read {kind} column"))?;
    let read = read.map(Pb::into_inner);
    if read != expected {
        bail!("{kind} read back as {read:?}, expected {expected:?}");
    }

    let mut scanned: Option<W> = None;
    scan_column(registry, row, idx, &mut scanned)
        .with_context(|| format!("Failed to scan {kind} column"))?;
    if scanned != expected {
        bail!("{kind} scanned as {scanned:?}, expected {expected:?}");
    }

    debug!("{kind} column {idx} matched");
    Ok(())
}
