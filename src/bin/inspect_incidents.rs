use arrow::array::Array;
use aircraft_incidents::{
    aggregate::year_range,
    cache::SourceKey,
    filter::filter_panel,
    load_incidents,
    view::{format_count, format_megabytes},
    IncidentTable,
};
use std::{env, path::Path, process::exit};
use tracing_subscriber::{fmt, EnvFilter};

fn main() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    // Expect exactly one CLI argument: path to an incident CSV.
    let args: Vec<String> = env::args().collect();
    if args.len() != 2 {
        eprintln!("Usage: {} <INCIDENT_CSV>", args[0]);
        exit(1);
    }
    let path = Path::new(&args[1]);
    let table = load_incidents(path);
    if table.is_empty() {
        eprintln!("Error: no incidents could be loaded from {}", path.display());
        exit(1);
    }
    inspect(path, &table);
}

/// Print the normalized schema, size and the option list of every filter.
fn inspect(path: &Path, table: &IncidentTable) {
    let key = SourceKey::stat(path);

    println!("=== Incident file: {} ===", path.display());
    println!(
        "Modified:             {}",
        key.modified
            .map(|m| m.to_rfc3339())
            .unwrap_or_else(|| "<unknown>".to_string())
    );
    println!("Rows:                 {}", format_count(table.num_rows() as i64));
    println!("Columns:              {}", table.num_columns());
    println!("In memory:            {}", format_megabytes(table.memory_size()));
    println!("Data range:           {}", year_range(table).map(|(a, b)| format!("{} - {}", a, b)));
    println!();

    println!("=== Columns ===");
    let schema = table.batch().schema();
    for field in schema.fields() {
        let nulls = table
            .column(field.name())
            .map(|c| c.null_count())
            .unwrap_or(0);
        println!(
            "- {:<30} | {:<8} | missing: {}",
            field.name(),
            field.data_type().to_string(),
            nulls
        );
    }
    println!();

    println!("=== Filters ===");
    for control in filter_panel(table) {
        // "All" plus at most a handful of values.
        let shown: Vec<&str> = control.options.iter().skip(1).take(8).map(String::as_str).collect();
        let more = control.options.len().saturating_sub(1 + shown.len());
        print!("- {:<22} ({}): {}", control.label, control.options.len() - 1, shown.join(", "));
        if more > 0 {
            print!(", … (+{})", more);
        }
        println!();
    }
}
