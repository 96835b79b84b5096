use chrono::NaiveTime;
use columnar::aggregate::{Mean, TimeCount};
use columnar::{AggregateFunction, Column, ColumnType, SortDirection, Table, col};
use tracing_subscriber::EnvFilter;

fn main() -> columnar::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut ids = Column::new("id", ColumnType::Integer);
    let mut scores = Column::new("score", ColumnType::Float);
    let mut arrivals = Column::new("arrival", ColumnType::LocalTime);

    for i in 0..200i64 {
        ids.add(i)?;
        scores.add((i % 17) as f64 * 1.5)?;
        let minutes = u32::try_from(i * 7 % 1440).unwrap_or(0);
        if let Some(time) = NaiveTime::from_hms_opt(minutes / 60, minutes % 60, 0) {
            arrivals.add(time)?;
        }
    }
    ids.compact();

    let mut table = Table::new("visits");
    table.add_column(ids)?;
    table.add_column(scores)?;
    table.add_column(arrivals)?;

    let filter = col("score")
        .is_greater_than(12.0)
        .and(col("arrival").is_before(NaiveTime::from_hms_opt(12, 0, 0).unwrap_or_default()));
    let rows = filter.apply(&table)?;
    println!("{filter}: {} of {} rows", rows.len(), table.row_count());

    let selected = table.select_rows(&rows)?;
    let score = selected.column("score")?;
    println!("mean score of selection: {}", Mean.summarize(score)?);
    println!(
        "morning arrivals overall: {}",
        TimeCount::before_noon().summarize(table.column("arrival")?)?
    );

    let top = table.sort_on("score", SortDirection::Desc)?;
    for row in 0..3 {
        println!("{:?}", top.get_row(row)?);
    }

    print!("{}", table.column("score")?.summary()?);
    Ok(())
}
