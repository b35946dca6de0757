use csvbeam::*;

#[derive(Debug, Default)]
struct Line {
    text: String,
}

fn parser(keep_order: bool) -> anyhow::Result<CsvParser<Line>> {
    let mapping = CsvMapping::<Line>::builder()
        .map(0, |l: &mut Line, v: String| l.text = v)?
        .build();
    let options = ParserOptions::default()
        .with_skip_header(false)
        .with_degree_of_parallelism(2)
        .with_keep_order(keep_order);
    Ok(CsvParser::new(CsvConfig::new(Dialect::default(), options), mapping)?)
}

fn endless() -> impl Iterator<Item = Row> {
    (0..).map(|i| Row::new(i, format!("row{i}")))
}

#[test]
fn cancel_stops_an_endless_source() -> anyhow::Result<()> {
    for keep_order in [true, false] {
        let p = parser(keep_order)?;
        let mut stream = p.parse(endless());
        let mut seen = 0;
        for _ in stream.by_ref().take(50) {
            seen += 1;
        }
        stream.cancel();
        let drained = stream.by_ref().count();
        assert_eq!(seen, 50);
        assert!(drained <= 2 * csvbeam::runner::IN_FLIGHT_PER_WORKER);
        assert!(stream.next().is_none());
    }
    Ok(())
}

#[test]
fn cancel_from_another_thread() -> anyhow::Result<()> {
    let p = parser(true)?;
    let mut stream = p.parse(endless());
    let token = stream.cancel_token();
    let handle = std::thread::spawn(move || token.cancel());
    handle.join().expect("cancel thread panicked");
    assert!(stream.cancel_token().is_cancelled());
    assert!(stream.by_ref().count() <= 2 * csvbeam::runner::IN_FLIGHT_PER_WORKER);
    Ok(())
}

#[test]
fn yielded_results_stay_valid_after_cancel() -> anyhow::Result<()> {
    let p = parser(true)?;
    let mut stream = p.parse(endless());
    let before: Vec<_> = stream.by_ref().take(20).collect();
    stream.cancel();
    let after: Vec<_> = stream.collect();
    for (i, r) in before.iter().enumerate() {
        assert_eq!(r.row_index(), i);
    }
    // Rows abandoned by the cancel leave gaps, but order and content still hold.
    let mut last = before.last().map(|r| r.row_index());
    for r in &after {
        assert!(last.is_none_or(|l| r.row_index() > l));
        last = Some(r.row_index());
    }
    for r in before.iter().chain(after.iter()) {
        let expected = format!("row{}", r.row_index());
        assert_eq!(r.entity().map(|l| l.text.as_str()), Some(expected.as_str()));
    }
    Ok(())
}

#[test]
fn dropping_a_stream_early_is_clean() -> anyhow::Result<()> {
    let p = parser(false)?;
    for _ in 0..10 {
        let mut stream = p.parse(endless());
        assert!(stream.next().is_some());
    }
    assert_eq!(p.parse(Row::enumerate(["a", "b"])).count(), 2);
    Ok(())
}
