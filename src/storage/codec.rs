//! Line-oriented record format for persisted documents.
//!
//! ```text
//! d/articles              document name, always first
//! m/title                 schema field name
//! l/text                  schema field kind
//! id/n/1                  number field
//! title/t/Windy London    text field, raw value
//! w/windi                 stemmed term
//! c/1                     its count in this field
//! s/0.47                  its bm25 score
//! url/k/https://a/b       keyword field
//! published/b/1           boolean field
//! ;                       end of entry
//! ```
//!
//! Records are split on their first two `/` only. Two-part records never
//! carry a second `/`, since names are checked on encode and terms come out
//! of the analyzer. Field values escape `\`, newline and carriage return.

use std::fmt::Write;
use nom::{IResult, Parser};
use nom::branch::alt;
use nom::bytes::complete::take_till;
use nom::character::complete::char;
use nom::combinator::{map, rest};
use nom::sequence::terminated;
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::types::{Entry, FieldValue, TextValue};
use crate::index::posting::TermInfo;
use crate::schema::schema::{FieldKind, Schema};

/// Everything a document persists. The index is never part of it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentImage {
    pub name: String,
    pub schema: Schema,
    pub entries: Vec<Entry>,
}

#[derive(Debug, PartialEq)]
enum Record<'a> {
    End,
    Typed { code: &'a str, value: &'a str },
    Keyed { key: &'a str, code: &'a str, value: &'a str },
}

fn segment(input: &str) -> IResult<&str, &str> {
    terminated(take_till(|c: char| c == '/'), char('/')).parse(input)
}

fn record(line: &str) -> IResult<&str, Record<'_>> {
    alt((
        map((segment, segment, rest), |(key, code, value)| Record::Keyed { key, code, value }),
        map((segment, rest), |(code, value)| Record::Typed { code, value }),
    ))
    .parse(line)
}

fn parse_line(line: &str) -> Option<Record<'_>> {
    if line == ";" {
        return Some(Record::End);
    }
    record(line).ok().map(|(_, record)| record)
}

fn check_name(what: &str, name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::new(ErrorKind::InvalidArgument, format!("{} cannot be empty", what)));
    }
    if name.contains(['/', '\n', '\r']) {
        return Err(Error::new(
            ErrorKind::InvalidArgument,
            format!("{} '{}' cannot be stored: names may not contain '/' or line breaks", what, name.escape_debug()),
        ));
    }
    Ok(())
}

pub fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
    out
}

pub fn unescape(value: &str) -> Option<String> {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next()? {
            '\\' => out.push('\\'),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            _ => return None,
        }
    }
    Some(out)
}

/// Writes name, schema and entries as records.
///
/// Fails with `InvalidArgument` when the document or a field name cannot be
/// represented in the format, or when an entry does not match the schema.
pub fn encode<'e, I>(name: &str, schema: &Schema, entries: I) -> Result<String>
where
    I: IntoIterator<Item = &'e Entry>,
{
    check_name("document name", name)?;

    let mut out = String::new();
    // writing to a String cannot fail
    let _ = writeln!(out, "d/{}", name);

    for definition in &schema.fields {
        check_name("field name", &definition.name)?;
        let _ = writeln!(out, "m/{}", definition.name);
        let _ = writeln!(out, "l/{}", definition.kind);
    }

    for (i, entry) in entries.into_iter().enumerate() {
        schema.check_complete(entry).map_err(|e| {
            Error::new(ErrorKind::InvalidArgument, format!("entry {} cannot be stored: {}", i, e.context))
        })?;
        for field in &entry.fields {
            match &field.value {
                FieldValue::Number(n) => {
                    let _ = writeln!(out, "{}/n/{}", field.name, n);
                }
                FieldValue::Text(text) => {
                    let _ = writeln!(out, "{}/t/{}", field.name, escape(&text.raw));
                    for term in &text.terms {
                        let info = text.term_stats.get(term).copied().unwrap_or_default();
                        let _ = writeln!(out, "w/{}\nc/{}\ns/{}", escape(term), info.count, info.score);
                    }
                }
                FieldValue::Keyword(keyword) => {
                    let _ = writeln!(out, "{}/k/{}", field.name, escape(keyword));
                }
                FieldValue::Boolean(b) => {
                    let _ = writeln!(out, "{}/b/{}", field.name, if *b { 1 } else { 0 });
                }
            }
        }
        out.push_str(";\n");
    }

    Ok(out)
}

/// Term record being assembled from `w`, `c` and `s` lines.
struct PendingTerm {
    term: String,
    count: Option<u16>,
}

#[derive(Default)]
struct Decoder {
    image: DocumentImage,
    entry: Entry,
    pending_field: Option<String>,
    pending_term: Option<PendingTerm>,
    entries_started: bool,
}

impl Decoder {
    fn typed(&mut self, line_no: usize, code: &str, value: &str) -> Result<()> {
        match code {
            "m" => {
                if self.entries_started {
                    return Err(Error::corrupt(line_no, "schema record after the first entry"));
                }
                if value.is_empty() {
                    return Err(Error::corrupt(line_no, "empty field name"));
                }
                if self.pending_field.replace(value.to_string()).is_some() {
                    return Err(Error::corrupt(line_no, "schema name without a kind"));
                }
            }
            "l" => {
                let name = self
                    .pending_field
                    .take()
                    .ok_or_else(|| Error::corrupt(line_no, "schema kind without a name"))?;
                let kind: FieldKind = value
                    .parse()
                    .map_err(|_| Error::corrupt(line_no, format!("unknown field kind '{}'", value)))?;
                self.image.schema.declare(&name, kind);
            }
            "w" => {
                self.current_text(line_no)?;
                if self.pending_term.is_some() {
                    return Err(Error::corrupt(line_no, "term without count and score"));
                }
                let term = unescape(value).ok_or_else(|| Error::corrupt(line_no, "bad escape in term"))?;
                self.pending_term = Some(PendingTerm { term, count: None });
            }
            "c" => {
                let count = value
                    .parse()
                    .map_err(|_| Error::corrupt(line_no, format!("bad term count '{}'", value)))?;
                match &mut self.pending_term {
                    Some(pending) if pending.count.is_none() => pending.count = Some(count),
                    _ => return Err(Error::corrupt(line_no, "count without a term")),
                }
            }
            "s" => {
                let score: f64 = value
                    .parse()
                    .map_err(|_| Error::corrupt(line_no, format!("bad term score '{}'", value)))?;
                let (term, count) = match self.pending_term.take() {
                    Some(PendingTerm { term, count: Some(count) }) => (term, count),
                    _ => return Err(Error::corrupt(line_no, "score without a term and count")),
                };
                let text = self.current_text(line_no)?;
                text.term_stats.insert(term.clone(), TermInfo { count, score });
                text.terms.push(term);
            }
            "d" => return Err(Error::corrupt(line_no, "document name repeated")),
            other => return Err(Error::corrupt(line_no, format!("unknown record type '{}'", other))),
        }
        Ok(())
    }

    fn keyed(&mut self, line_no: usize, key: &str, code: &str, value: &str) -> Result<()> {
        self.finish_term(line_no)?;
        if key.is_empty() {
            return Err(Error::corrupt(line_no, "empty field name"));
        }
        if self.pending_field.is_some() {
            return Err(Error::corrupt(line_no, "schema name without a kind"));
        }
        self.entries_started = true;

        let bad_value = || Error::corrupt(line_no, format!("bad {} value for field '{}'", code, key));
        let value = match code {
            "n" => FieldValue::Number(value.parse().map_err(|_| bad_value())?),
            "t" => FieldValue::Text(TextValue::new(unescape(value).ok_or_else(bad_value)?)),
            "k" => FieldValue::Keyword(unescape(value).ok_or_else(bad_value)?),
            "b" => match value {
                "1" => FieldValue::Boolean(true),
                "0" => FieldValue::Boolean(false),
                _ => return Err(bad_value()),
            },
            other => return Err(Error::corrupt(line_no, format!("unknown field type '{}'", other))),
        };
        self.entry.add_field(key, value);
        Ok(())
    }

    fn end(&mut self, line_no: usize) -> Result<()> {
        self.finish_term(line_no)?;
        if self.pending_field.is_some() {
            return Err(Error::corrupt(line_no, "schema name without a kind"));
        }
        self.entries_started = true;
        let entry = std::mem::take(&mut self.entry);
        self.image
            .schema
            .check_complete(&entry)
            .map_err(|e| Error::corrupt(line_no, e.context))?;
        self.image.entries.push(entry);
        Ok(())
    }

    fn current_text(&mut self, line_no: usize) -> Result<&mut TextValue> {
        match self.entry.fields.last_mut().map(|field| &mut field.value) {
            Some(FieldValue::Text(text)) => Ok(text),
            _ => Err(Error::corrupt(line_no, "term record outside a text field")),
        }
    }

    fn finish_term(&self, line_no: usize) -> Result<()> {
        if self.pending_term.is_some() {
            return Err(Error::corrupt(line_no, "term without count and score"));
        }
        Ok(())
    }

    fn finish(self, line_no: usize) -> Result<DocumentImage> {
        self.finish_term(line_no)?;
        if self.pending_field.is_some() {
            return Err(Error::corrupt(line_no, "schema name without a kind"));
        }
        if !self.entry.is_empty() {
            return Err(Error::corrupt(line_no, "truncated entry: missing ';'"));
        }
        Ok(self.image)
    }
}

/// Parses records back into a document image. Any deviation from the
/// format is a `CorruptStore` error naming the offending line.
pub fn decode(text: &str) -> Result<DocumentImage> {
    let mut lines = text.lines().enumerate().map(|(i, line)| (i + 1, line));

    let name = match lines.next().and_then(|(_, line)| parse_line(line)) {
        Some(Record::Typed { code: "d", value }) if !value.is_empty() => value.to_string(),
        _ => return Err(Error::corrupt(1, "missing document name record")),
    };

    let mut decoder = Decoder::default();
    decoder.image.name = name;

    let mut last_line = 1;
    for (line_no, line) in lines {
        last_line = line_no;
        match parse_line(line) {
            Some(Record::End) => decoder.end(line_no)?,
            Some(Record::Typed { code, value }) => decoder.typed(line_no, code, value)?,
            Some(Record::Keyed { key, code, value }) => decoder.keyed(line_no, key, code, value)?,
            None => return Err(Error::corrupt(line_no, format!("unreadable record '{}'", line))),
        }
    }

    decoder.finish(last_line)
}
