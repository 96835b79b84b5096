use chrono::{NaiveDate, NaiveTime};
use columnar::aggregate::{Sum, TimeCount};
use columnar::{AggregateFunction, Column, ColumnError, ColumnType, Table, Value, col};

fn ints(values: &[i64]) -> Column {
    Column::from_values("n", ColumnType::Integer, values.iter().copied()).unwrap()
}

#[test]
fn scenario_a_filter_and_sort() {
    let column = ints(&[5, 2, 9, 2, 7]);

    let rows = column.is_greater_than(4).unwrap();
    assert_eq!(rows.to_vec(), vec![0, 2, 4]);

    let sorted = column.sort_ascending();
    assert_eq!(sorted.as_integers().unwrap(), &[2, 2, 5, 7, 9]);
    assert_eq!(column.as_integers().unwrap(), &[5, 2, 9, 2, 7]);
}

#[test]
fn scenario_b_empty_column_sum_is_identity() {
    let column = Column::new("n", ColumnType::Integer);
    assert!(column.is_empty());
    assert_eq!(Sum.summarize(&column).unwrap(), Value::Integer(0));
    assert_eq!(column.sum().unwrap(), Value::Integer(0));
}

#[test]
fn scenario_c_single_reallocation_past_default_capacity() {
    let mut column = Column::new("n", ColumnType::Integer);
    for i in 0..130i64 {
        column.add(i).unwrap();
    }

    assert_eq!(column.reallocations(), 1);
    assert_eq!(column.capacity(), 256);
    assert_eq!(column.len(), 130);
    for i in 0..130 {
        assert_eq!(column.get(i).unwrap(), Value::Integer(i as i64));
    }
}

#[test]
fn comparisons_partition_rows() {
    let column = ints(&[3, -1, 8, 3, 0, 12]);
    let all: Vec<usize> = (0..column.len()).collect();

    for t in [-5, 0, 3, 7, 20] {
        let lt = column.is_less_than(t).unwrap();
        let ge = column.is_greater_than_or_equal_to(t).unwrap();
        assert!(lt.and(&ge).is_empty());
        assert_eq!(lt.or(&ge).to_vec(), all);

        let le = column.is_less_than_or_equal_to(t).unwrap();
        let gt = column.is_greater_than(t).unwrap();
        assert!(le.and(&gt).is_empty());
        assert_eq!(le.or(&gt).to_vec(), all);
    }
}

#[test]
fn late_bound_filter_applies_to_any_table() {
    let filter = col("when").is_after(NaiveDate::from_ymd_opt(2016, 1, 1).unwrap());

    let mut first = Table::new("first");
    first
        .add_column(
            Column::from_values(
                "when",
                ColumnType::LocalDate,
                [
                    NaiveDate::from_ymd_opt(2015, 5, 1).unwrap(),
                    NaiveDate::from_ymd_opt(2017, 5, 1).unwrap(),
                ],
            )
            .unwrap(),
        )
        .unwrap();
    assert_eq!(filter.apply(&first).unwrap().to_vec(), vec![1]);

    let mut second = Table::new("second");
    second.add_column(ints(&[1, 2])).unwrap();
    assert!(matches!(
        filter.apply(&second).unwrap_err(),
        ColumnError::ColumnNotFound { .. }
    ));

    let mut third = Table::new("third");
    let mut when = ints(&[1, 2]);
    when.set_name("when");
    third.add_column(when).unwrap();
    assert!(matches!(
        filter.apply(&third).unwrap_err(),
        ColumnError::TypeMismatch { .. }
    ));
}

#[test]
fn time_aggregate_over_filtered_rows() {
    let times = [(8, 0), (11, 59), (12, 0), (23, 30), (6, 15)]
        .map(|(h, m)| NaiveTime::from_hms_opt(h, m, 0).unwrap());
    let mut table = Table::new("shifts");
    table
        .add_column(Column::from_values("start", ColumnType::LocalTime, times).unwrap())
        .unwrap();
    let staffed = [true, false, true, true, false];
    table
        .add_column(Column::from_values("staffed", ColumnType::Boolean, staffed).unwrap())
        .unwrap();

    let staffed = table.filter(&col("staffed").is_true()).unwrap();
    let start = staffed.column("start").unwrap();
    assert_eq!(
        TimeCount::before_noon().summarize(start).unwrap(),
        Value::Integer(1)
    );
    assert_eq!(
        TimeCount::after_noon().summarize(start).unwrap(),
        Value::Integer(2)
    );
}

#[test]
fn misuse_fails_fast() {
    let column = ints(&[1, 2, 3]);
    assert!(matches!(
        column.get(3).unwrap_err(),
        ColumnError::IndexOutOfBounds { row: 3, size: 3 }
    ));
    assert!(matches!(
        TimeCount::noon().summarize(&column).unwrap_err(),
        ColumnError::TypeMismatch { .. }
    ));
    assert!(matches!(
        column.is_before(1).unwrap_err(),
        ColumnError::TypeMismatch { .. }
    ));
}
