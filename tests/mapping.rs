use csvbeam::converter::TypeConverterProvider;
use csvbeam::mapping::{CsvMapping, CsvMappingBuilder, HeaderMappingBuilder};
use csvbeam::tokenizer::tokenize;
use csvbeam::{ConfigError, ConvertError, Dialect, ErrorReason, FnConverter, TokenizedRow};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Default, Clone, PartialEq)]
struct Person {
    first_name: String,
    last_name: String,
    birth_date: String,
}

fn person_mapping() -> anyhow::Result<CsvMapping<Person>> {
    Ok(CsvMapping::<Person>::builder()
        .map(0, |p: &mut Person, v: String| p.first_name = v)?
        .map(1, |p: &mut Person, v: String| p.last_name = v)?
        .map(2, |p: &mut Person, v: String| p.birth_date = v)?
        .build())
}

fn fields(line: &str) -> Vec<String> {
    tokenize(line, &Dialect::delimited(';')).expect("valid line")
}

#[test]
fn maps_all_columns() -> anyhow::Result<()> {
    let mapping = person_mapping()?;
    let result = mapping.map(4, &fields("Philipp;Wagner;1986/05/12"));
    assert_eq!(result.row_index(), 4);
    assert_eq!(
        result.into_result()?,
        Person {
            first_name: "Philipp".into(),
            last_name: "Wagner".into(),
            birth_date: "1986/05/12".into(),
        }
    );
    Ok(())
}

#[test]
fn short_row_fails_with_column_index() -> anyhow::Result<()> {
    let mapping = person_mapping()?;
    let result = mapping.map(1, &fields("Max;Mustermann"));
    assert!(!result.is_success());
    let err = result.err().expect("failure");
    assert_eq!(err.reason, ErrorReason::ColumnIndex);
    assert_eq!(err.column_index, Some(2));
    assert_eq!(err.value, "2");
    assert_eq!(err.message, "Column 2 is Out Of Range");
    Ok(())
}

#[test]
fn conversion_failure_echoes_raw_value() -> anyhow::Result<()> {
    #[derive(Default)]
    struct Reading {
        id: u32,
        value: f64,
    }
    let mapping = CsvMapping::<Reading>::builder()
        .map(0, |r: &mut Reading, v: u32| r.id = v)?
        .map(1, |r: &mut Reading, v: f64| r.value = v)?
        .build();

    let err = mapping
        .map(0, &["7".into(), "n/a".into()])
        .err()
        .expect("failure");
    assert_eq!(err.reason, ErrorReason::Conversion);
    assert_eq!(err.column_index, Some(1));
    assert_eq!(err.value, "n/a");
    assert_eq!(err.message, "Column 1 with Value 'n/a' cannot be converted");
    assert!(err.cause.is_some());

    let ok = mapping.map(0, &["7".into(), "1.25".into()]).ok().expect("success");
    assert_eq!((ok.id, ok.value), (7, 1.25));
    Ok(())
}

#[test]
fn first_failure_stops_mapping() -> anyhow::Result<()> {
    let calls = Arc::new(AtomicUsize::new(0));
    let counted = Arc::clone(&calls);
    let mapping = CsvMapping::<Person>::builder()
        .map(0, |_: &mut Person, _: u8| {})?
        .map(1, move |p: &mut Person, v: String| {
            counted.fetch_add(1, Ordering::SeqCst);
            p.last_name = v;
        })?
        .build();
    let result = mapping.map(0, &["not a number".into(), "b".into()]);
    assert_eq!(result.reason(), Some(ErrorReason::Conversion));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    Ok(())
}

#[test]
fn extra_fields_are_ignored() -> anyhow::Result<()> {
    let mapping = person_mapping()?;
    assert!(mapping.map(0, &fields("a;b;c;d;e")).is_success());
    Ok(())
}

#[test]
fn map_row_uses_row_index() -> anyhow::Result<()> {
    let mapping = person_mapping()?;
    let row = TokenizedRow::new(9, fields("a;b;c"));
    assert_eq!(mapping.map_row(&row).row_index(), 9);
    Ok(())
}

#[test]
fn duplicate_index_is_rejected_at_build_time() {
    let result = CsvMapping::<Person>::builder()
        .map(0, |p: &mut Person, v: String| p.first_name = v)
        .and_then(|b| b.map(0, |p: &mut Person, v: String| p.last_name = v));
    assert!(matches!(
        result,
        Err(ConfigError::DuplicateColumnIndex { index: 0 })
    ));
}

#[test]
fn unregistered_type_is_rejected_at_build_time() {
    #[derive(Default)]
    struct Holder {
        bytes: Vec<u8>,
    }
    let result = CsvMappingBuilder::<Holder>::with_provider(TypeConverterProvider::default())
        .map(0, |h: &mut Holder, v: Vec<u8>| h.bytes = v);
    assert!(matches!(result, Err(ConfigError::NoConverter { .. })));
}

#[test]
fn explicit_converter() -> anyhow::Result<()> {
    let mapping = CsvMapping::<Person>::builder()
        .map_with(
            0,
            |p: &mut Person, v: String| p.first_name = v,
            FnConverter(|v: &str| Ok::<_, ConvertError>(v.to_uppercase())),
        )?
        .build();
    let person = mapping.map(0, &["ada".into()]).into_result()?;
    assert_eq!(person.first_name, "ADA");
    Ok(())
}

#[test]
fn column_indices_in_table_order() -> anyhow::Result<()> {
    let mapping = CsvMapping::<Person>::builder()
        .map(2, |p: &mut Person, v: String| p.birth_date = v)?
        .map(0, |p: &mut Person, v: String| p.first_name = v)?
        .build();
    assert_eq!(mapping.column_indices().collect::<Vec<_>>(), vec![2, 0]);
    assert_eq!(mapping.len(), 2);
    Ok(())
}

fn header_builder() -> anyhow::Result<HeaderMappingBuilder<Person>> {
    Ok(HeaderMappingBuilder::<Person>::new()
        .map("last", |p: &mut Person, v: String| p.last_name = v)?
        .map("first", |p: &mut Person, v: String| p.first_name = v)?)
}

#[test]
fn header_mapping_resolves_positions() -> anyhow::Result<()> {
    let mapping = header_builder()?.build(&["id", "first", "last", "unused"])?;
    assert_eq!(mapping.column_indices().collect::<Vec<_>>(), vec![1, 2]);
    let person = mapping
        .map(1, &["1".into(), "Ada".into(), "Lovelace".into(), "x".into()])
        .into_result()?;
    assert_eq!(person.first_name, "Ada");
    assert_eq!(person.last_name, "Lovelace");
    Ok(())
}

#[test]
fn header_mapping_errors() -> anyhow::Result<()> {
    let builder = header_builder()?;
    let empty: [&str; 0] = [];
    assert!(matches!(builder.build(&empty), Err(ConfigError::MissingHeader)));
    assert!(matches!(
        builder.build(&["first"]),
        Err(ConfigError::UnknownColumn { name }) if name == "last"
    ));
    assert!(matches!(
        builder.build(&["first", "last", "first"]),
        Err(ConfigError::DuplicateHeaderColumn { name }) if name == "first"
    ));
    // Repeated columns nobody binds are fine.
    assert!(builder.build(&["x", "first", "x", "last"]).is_ok());
    Ok(())
}

#[test]
fn header_duplicate_name_binding() {
    let result = HeaderMappingBuilder::<Person>::new()
        .map("first", |p: &mut Person, v: String| p.first_name = v)
        .and_then(|b| b.map("first", |p: &mut Person, v: String| p.last_name = v));
    assert!(matches!(
        result,
        Err(ConfigError::DuplicateColumnName { name }) if name == "first"
    ));
}
