use anyhow::Result;
use sexpr_plus::decode::DecodeError;
use sexpr_plus::grammar::Grammar;
use sexpr_plus::pos::Span;
use sexpr_plus::read::{read_all, read_all_with, read_file, read_named, read_str,
                       write_all, write_file, ReadError};
use sexpr_plus::settings::FRAGMENT_SETTINGS;
use sexpr_plus::value::atom;
use std::path::PathBuf;

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("sexpr-plus-{}-{}.scm", std::process::id(), name))
}

#[test]
fn write_then_read_file() -> Result<()> {
    let path = temp_path("roundtrip");
    let forms = read_str("(a \"b\\n\") 'c")?;
    write_file(&path, &forms)?;
    assert_eq!(std::fs::read_to_string(&path)?, "(a \"b\\n\")\n(quote c)\n");
    let doc = read_file(&path)?;
    std::fs::remove_file(&path)?;
    assert_eq!(doc.forms.len(), 2);
    assert!(doc.forms.iter().zip(&forms).all(|(a, b)| a.content_eq(b)));
    assert_eq!(doc.text(doc.forms[1].span()), "(quote c)");
    Ok(())
}

#[test]
fn file_errors_name_the_file() -> Result<()> {
    let path = temp_path("broken");
    std::fs::write(&path, "(a\n  b")?;
    let e = read_file(&path).unwrap_err();
    std::fs::remove_file(&path)?;
    assert!(matches!(&e.err, ReadError::PE(pe) if pe.offset() == 6));
    assert_eq!(e.to_string(),
               format!("expected atom or closing paren or opening paren or quote \
                        or string literal in {}:2:4", path.display()));
    Ok(())
}

#[test]
fn missing_file() {
    let path = temp_path("does-not-exist");
    let e = read_file(&path).unwrap_err();
    assert!(matches!(e.err, ReadError::IO(_)));
    assert!(e.to_string().starts_with(&format!("{:?}: ", path)));
}

#[test]
fn named_buffers() {
    let e = read_named("test", &b"(a"[..]).unwrap_err();
    assert_eq!(e.to_string(),
               "expected atom or closing paren or opening paren or quote \
                or string literal from (test) at line 1, column 3");
}

#[test]
fn invalid_utf8() {
    match read_all(&b"(a \xff)"[..]) {
        Err(ReadError::Decode(DecodeError::InvalidUtf8 { bytes, offset, pos })) => {
            assert_eq!(bytes, vec![0xff]);
            assert_eq!(offset, 3);
            assert_eq!((pos.line, pos.col), (1, 4));
        }
        r => panic!("expected a decode error, got {:?}", r),
    }
    let e = read_named("test", &b"\n\xff"[..]).unwrap_err();
    assert_eq!(e.to_string(), "invalid UTF-8 byte sequence [ff] from (test) at line 2, column 1");
}

#[test]
fn read_with_settings() -> Result<()> {
    let g = Grammar::with_settings(FRAGMENT_SETTINGS);
    let doc = read_all_with(&g, &b"#!x y"[..])?;
    assert_eq!(doc.forms.len(), 2);
    assert_eq!(doc.forms[0].node().as_atom(), Some("#!x"));
    Ok(())
}

#[test]
fn written_shebang_like_atom_reads_back() -> Result<()> {
    let forms = vec![atom("#!x").at(Span::default()), atom("y").at(Span::default())];
    let mut out = Vec::<u8>::new();
    write_all(&mut out, &forms)?;
    let written = String::from_utf8(out)?;
    assert_eq!(written, " #!x\ny\n");
    let back = read_str(&written)?;
    assert_eq!(back.len(), 2);
    assert!(back.iter().zip(&forms).all(|(a, b)| a.content_eq(b)));

    // only the start of the buffer is special
    let forms = vec![atom("y").at(Span::default()), atom("#!x").at(Span::default())];
    let mut out = Vec::<u8>::new();
    write_all(&mut out, &forms)?;
    assert_eq!(String::from_utf8(out)?, "y\n#!x\n");
    Ok(())
}
