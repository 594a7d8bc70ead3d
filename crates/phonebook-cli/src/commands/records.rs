use anyhow::{Result, anyhow, bail};
use phonebook_application::{PhonebookApp, RecordsState};
use phonebook_core::filter::FilterSet;
use phonebook_core::record::{Record, RecordId};

pub async fn list(
    app: &PhonebookApp,
    page: u64,
    sort_by: Option<String>,
    desc: bool,
    filters: &[String],
) -> Result<()> {
    let mut filter_set = FilterSet::new().with_page(page);
    if let Some(field) = sort_by {
        filter_set = filter_set.with_sort(field, desc);
    }
    for (key, value) in parse_pairs(filters)? {
        filter_set = filter_set.with(key, value);
    }

    app.records().fetch_all_records(filter_set).await?;
    print_state(&app.records_state())
}

pub async fn create(app: &PhonebookApp, fields: &[String]) -> Result<()> {
    let record = build_record(None, fields)?;
    app.records().create_record(record).await?;
    println!("Record created.");
    print_state(&app.records_state())
}

pub async fn update(app: &PhonebookApp, id: RecordId, fields: &[String]) -> Result<()> {
    let record = build_record(Some(id), fields)?;
    app.records().update_record(record).await?;
    println!("Record {} updated.", id);
    print_state(&app.records_state())
}

pub async fn delete(app: &PhonebookApp, id: RecordId) -> Result<()> {
    app.records().delete_record(id).await?;
    println!("Record {} deleted.", id);
    print_state(&app.records_state())
}

fn build_record(id: Option<RecordId>, fields: &[String]) -> Result<Record> {
    if fields.is_empty() {
        bail!("at least one --field KEY=VALUE is required");
    }
    let mut record = Record::new();
    record.id = id;
    for (key, value) in parse_pairs(fields)? {
        record = record.with_field(key, value);
    }
    Ok(record)
}

fn parse_pairs(pairs: &[String]) -> Result<Vec<(String, String)>> {
    pairs
        .iter()
        .map(|pair| {
            pair.split_once('=')
                .filter(|(key, _)| !key.is_empty())
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .ok_or_else(|| anyhow!("expected KEY=VALUE, got '{}'", pair))
        })
        .collect()
}

fn print_state(state: &RecordsState) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&state.records)?);
    println!(
        "page size {} | {} records | {} pages",
        state.items_per_page(),
        state.total_records(),
        state.total_pages()
    );
    if let Some(error) = &state.error {
        eprintln!("error: {}", error);
    }
    Ok(())
}
