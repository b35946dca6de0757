use csvbeam::{StringSplitTokenizer, Tokenizer};

#[test]
fn split_ignores_quotes() -> anyhow::Result<()> {
    let t = StringSplitTokenizer::new(';');
    assert_eq!(t.tokenize(r#""a;b";c"#)?, vec![r#""a"#, r#"b""#, "c"]);
    Ok(())
}

#[test]
fn split_trimmed() -> anyhow::Result<()> {
    let t = StringSplitTokenizer::new(',').trimmed();
    assert_eq!(t.tokenize(" a , b ,c")?, vec!["a", "b", "c"]);
    Ok(())
}

#[test]
fn split_empty_line() -> anyhow::Result<()> {
    assert!(StringSplitTokenizer::new(',').tokenize("")?.is_empty());
    Ok(())
}

#[cfg(feature = "regex")]
mod quoted {
    use csvbeam::{QuotedStringTokenizer, Tokenizer};

    #[test]
    fn unquotes_and_splits_outside_quotes() -> anyhow::Result<()> {
        let t = QuotedStringTokenizer::new(',')?;
        assert_eq!(
            t.tokenize(r#"1,"a,b","say ""hi""",last"#)?,
            vec!["1", "a,b", r#"say "hi""#, "last"]
        );
        Ok(())
    }

    #[test]
    fn keeps_empty_fields() -> anyhow::Result<()> {
        let t = QuotedStringTokenizer::new(';')?;
        assert_eq!(t.tokenize("a;;c")?, vec!["a", "", "c"]);
        Ok(())
    }

    #[test]
    fn custom_quote() -> anyhow::Result<()> {
        let t = QuotedStringTokenizer::with_quote(',', '\'')?;
        assert_eq!(t.tokenize("'x,y',z")?, vec!["x,y", "z"]);
        Ok(())
    }
}
