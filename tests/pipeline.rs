use csvbeam::*;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[derive(Debug, Default, Clone, PartialEq)]
struct Person {
    first_name: String,
    last_name: String,
    #[cfg(feature = "datetime")]
    birth_date: chrono::NaiveDate,
}

fn semicolon_config(options: ParserOptions) -> CsvConfig {
    CsvConfig::new(Dialect::delimited(';'), options)
}

fn name_mapping() -> anyhow::Result<CsvMapping<Person>> {
    Ok(CsvMapping::<Person>::builder()
        .map(0, |p: &mut Person, v: String| p.first_name = v)?
        .map(1, |p: &mut Person, v: String| p.last_name = v)?
        .build())
}

#[cfg(feature = "datetime")]
#[test]
fn parses_people_with_custom_date_format() -> anyhow::Result<()> {
    use csvbeam::converter::DateConverter;

    let mapping = CsvMapping::<Person>::builder()
        .map(0, |p: &mut Person, v: String| p.first_name = v)?
        .map(1, |p: &mut Person, v: String| p.last_name = v)?
        .map_with(
            2,
            |p: &mut Person, v: chrono::NaiveDate| p.birth_date = v,
            DateConverter::with_format("%Y/%m/%d"),
        )?
        .build();
    let parser = CsvParser::new(
        semicolon_config(ParserOptions::default().with_keep_order(true)),
        mapping,
    )?;

    let results: Vec<_> = parser
        .parse(Row::enumerate([
            "FirstName;LastName;BirthDate",
            "Philipp;Wagner;1986/05/12",
            "Max;Mustermann",
            "\"Phil\"ipp\";Wagner;1986/05/12",
        ]))
        .collect();
    assert_eq!(results.len(), 3);

    let philipp = results[0].entity().expect("success");
    assert_eq!(philipp.first_name, "Philipp");
    assert_eq!(philipp.last_name, "Wagner");
    assert_eq!(
        philipp.birth_date,
        chrono::NaiveDate::from_ymd_opt(1986, 5, 12).expect("valid date")
    );

    let max = results[1].error().expect("failure");
    assert_eq!(results[1].row_index(), 2);
    assert_eq!(max.reason, ErrorReason::ColumnIndex);
    assert_eq!(max.column_index, Some(2));

    let stray = results[2].error().expect("failure");
    assert_eq!(stray.reason, ErrorReason::Tokenization);
    assert_eq!(stray.column_index, None);
    assert_eq!(stray.value, "\"Phil\"ipp\";Wagner;1986/05/12");
    Ok(())
}

#[test]
fn filters_header_blank_and_comment_rows() -> anyhow::Result<()> {
    init_tracing();
    let options = ParserOptions::default()
        .with_comment_character("#")
        .with_keep_order(true);
    let parser = CsvParser::new(semicolon_config(options), name_mapping()?)?;

    let mut stream = parser.parse(Row::enumerate([
        "first;last",
        "",
        "# a comment",
        "Ada;Lovelace",
        "   ",
        "Alan;Turing",
    ]));
    let indices: Vec<usize> = stream.by_ref().map(|r| r.row_index()).collect();
    assert_eq!(indices, vec![3, 5]);

    let summary = stream.summary();
    assert_eq!(summary.rows_read, 6);
    assert_eq!(summary.header_skipped, 1);
    assert_eq!(summary.blank_skipped, 2);
    assert_eq!(summary.comment_skipped, 1);
    assert_eq!(summary.succeeded, 2);
    assert_eq!(summary.failed(), 0);
    Ok(())
}

#[test]
fn header_kept_when_not_skipping() -> anyhow::Result<()> {
    let options = ParserOptions::default().with_skip_header(false);
    let parser = CsvParser::new(semicolon_config(options), name_mapping()?)?;
    let (ok, failed) = parser.parse(Row::enumerate(["first;last", "a;b"])).partition();
    assert_eq!(ok.len(), 2);
    assert!(failed.is_empty());
    Ok(())
}

#[test]
fn every_tokenized_row_yields_one_result() -> anyhow::Result<()> {
    init_tracing();
    let parser = CsvParser::new(
        semicolon_config(ParserOptions::default().with_degree_of_parallelism(4)),
        name_mapping()?,
    )?;
    let lines: Vec<String> = std::iter::once("h;h".to_string())
        .chain((1..=1000).map(|i| match i % 4 {
            0 => format!("only{i}"),
            1 => format!("\"bad\"{i};x"),
            _ => format!("a{i};b{i}"),
        }))
        .collect();

    let mut stream = parser.parse(Row::enumerate(lines));
    let (ok, failed) = partition_results(stream.by_ref());
    assert_eq!(ok.len() + failed.len(), 1000);
    assert_eq!(failed.len(), 500);

    let summary = stream.summary();
    assert_eq!(summary.succeeded, 500);
    assert_eq!(summary.column_index_failures, 250);
    assert_eq!(summary.tokenization_failures, 250);
    Ok(())
}

#[test]
fn trims_fields_when_configured() -> anyhow::Result<()> {
    let options = ParserOptions::default()
        .with_skip_header(false)
        .with_trim_fields(true);
    let parser = CsvParser::new(semicolon_config(options), name_mapping()?)?;
    let people: Vec<Person> = parser
        .parse(Row::enumerate(["  Ada ; Lovelace  "]))
        .filter_map(CsvMappingResult::ok)
        .collect();
    assert_eq!(people[0].first_name, "Ada");
    assert_eq!(people[0].last_name, "Lovelace");
    Ok(())
}

#[test]
fn custom_tokenizer() -> anyhow::Result<()> {
    let options = ParserOptions::default().with_skip_header(false);
    let tokenizer = StringSplitTokenizer::new('|').trimmed();
    let parser = CsvParser::with_tokenizer(options, tokenizer, name_mapping()?)?;
    let person = parser
        .parse(Row::enumerate(["Grace | Hopper"]))
        .next()
        .expect("one result")
        .into_result()?;
    assert_eq!(person.last_name, "Hopper");
    Ok(())
}

#[test]
fn read_from_str_numbers_lines() -> anyhow::Result<()> {
    let parser = CsvParser::new(
        semicolon_config(ParserOptions::default().with_keep_order(true)),
        name_mapping()?,
    )?;
    let data = "first;last\r\nAda;Lovelace\r\n\r\nAlan;Turing\r\n";
    let indices: Vec<_> = parser
        .read_from_str(data, &CsvReaderOptions::default())
        .map(|r| r.row_index())
        .collect();
    assert_eq!(indices, vec![1, 3]);
    Ok(())
}

#[test]
fn read_from_file() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("people.csv");
    std::fs::write(&path, "first;last\nAda;Lovelace\nAlan;Turing\n")?;

    let parser = CsvParser::new(
        semicolon_config(ParserOptions::default().with_keep_order(true)),
        name_mapping()?,
    )?;
    let people: Vec<Person> = parser
        .read_from_file(&path, &CsvReaderOptions::default())?
        .filter_map(CsvMappingResult::ok)
        .collect();
    assert_eq!(people.len(), 2);
    assert_eq!(people[1].first_name, "Alan");

    assert!(
        parser
            .read_from_file(dir.path().join("missing.csv"), &CsvReaderOptions::default())
            .is_err()
    );
    Ok(())
}

#[test]
fn invalid_configuration_fails_before_parsing() -> anyhow::Result<()> {
    let bad_dialect = CsvConfig::new(Dialect::delimited('"'), ParserOptions::default());
    assert!(matches!(
        CsvParser::new(bad_dialect, name_mapping()?),
        Err(ConfigError::InvalidDialect { .. })
    ));

    let zero = semicolon_config(ParserOptions::default().with_degree_of_parallelism(0));
    assert!(matches!(
        CsvParser::new(zero, name_mapping()?),
        Err(ConfigError::InvalidOptions { .. })
    ));
    Ok(())
}

#[test]
fn parser_is_reusable() -> anyhow::Result<()> {
    let options = ParserOptions::default().with_skip_header(false);
    let parser = CsvParser::new(semicolon_config(options), name_mapping()?)?;
    for _ in 0..3 {
        assert_eq!(parser.parse(Row::enumerate(["a;b", "c;d"])).count(), 2);
    }
    Ok(())
}

#[test]
fn panicking_setter_reaches_the_caller() -> anyhow::Result<()> {
    #[derive(Debug, Default)]
    struct Number(i32);

    let mapping = CsvMapping::<Number>::builder()
        .map(0, |n: &mut Number, v: i32| {
            if v == 3 {
                panic!("setter rejected {v}");
            }
            n.0 = v;
        })?
        .build();
    let options = ParserOptions::default()
        .with_skip_header(false)
        .with_keep_order(true);
    let parser = CsvParser::new(CsvConfig::new(Dialect::default(), options), mapping)?;

    let caught = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        parser.parse(Row::enumerate(["1", "2", "3", "4"])).count()
    }));
    let payload = caught.expect_err("panic propagates");
    assert_eq!(
        payload.downcast_ref::<String>().map(String::as_str),
        Some("setter rejected 3")
    );

    // Workers survive the panic.
    assert_eq!(parser.parse(Row::enumerate(["1", "2"])).count(), 2);
    Ok(())
}
