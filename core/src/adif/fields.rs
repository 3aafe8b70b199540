//! Tag walker for ADIF text.
//!
//! Each record chunk becomes a [`FieldTable`] mapping upper-cased tag names to
//! their raw values. Field semantics live in the parser, not here.

/// Raw fields of one record chunk, in file order.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct FieldTable<'a> {
    fields: Vec<(String, &'a str)>,
}

impl<'a> FieldTable<'a> {
    /// First value logged under `name`; empty values read as absent.
    pub fn get(&self, name: &str) -> Option<&'a str> {
        self.fields
            .iter()
            .find(|(tag, _)| tag.eq_ignore_ascii_case(name))
            .map(|(_, value)| *value)
            .filter(|value| !value.is_empty())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn push(&mut self, name: &str, value: &'a str) {
        self.fields.push((name.to_ascii_uppercase(), value));
    }
}

enum Tag<'a> {
    EndOfRecord,
    EndOfHeader,
    Field(&'a str),
    Malformed,
}

/// Parses the inside of `<...>`: `NAME:len[:type]`, or the bare `EOR`/`EOH` markers.
fn classify_tag(body: &str) -> Tag<'_> {
    let mut parts = body.split(':');
    let name = parts.next().unwrap_or_default().trim();
    let length = parts.next();
    let data_type = parts.next();

    if length.is_none() {
        if name.eq_ignore_ascii_case("eor") {
            return Tag::EndOfRecord;
        }
        if name.eq_ignore_ascii_case("eoh") {
            return Tag::EndOfHeader;
        }
        return Tag::Malformed;
    }

    let is_word = |s: &str| {
        !s.is_empty() && s.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
    };
    let length_ok = length.is_some_and(|l| !l.is_empty() && l.bytes().all(|b| b.is_ascii_digit()));
    let type_ok = data_type.map_or(true, is_word);

    if is_word(name) && length_ok && type_ok && parts.next().is_none() {
        Tag::Field(name)
    } else {
        Tag::Malformed
    }
}

/// Lazy iterator over the record chunks of one file.
pub struct Chunks<'a> {
    rest: &'a str,
}

impl<'a> Chunks<'a> {
    pub fn new(content: &'a str) -> Self {
        Self { rest: content }
    }
}

impl<'a> Iterator for Chunks<'a> {
    type Item = FieldTable<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut table = FieldTable::default();

        loop {
            let Some(open) = self.rest.find('<') else {
                self.rest = "";
                break;
            };
            let after_open = &self.rest[open + 1..];
            let Some(close) = after_open.find('>') else {
                self.rest = "";
                break;
            };
            let body = &after_open[..close];
            let after_tag = &after_open[close + 1..];

            match classify_tag(body) {
                Tag::EndOfRecord => {
                    self.rest = after_tag;
                    if table.is_empty() {
                        continue;
                    }
                    return Some(table);
                }
                Tag::EndOfHeader => {
                    self.rest = after_tag;
                    table = FieldTable::default();
                }
                Tag::Field(name) => {
                    let value_end = after_tag.find('<').unwrap_or(after_tag.len());
                    table.push(name, after_tag[..value_end].trim());
                    self.rest = &after_tag[value_end..];
                }
                Tag::Malformed => {
                    self.rest = after_tag;
                }
            }
        }

        if table.is_empty() {
            None
        } else {
            Some(table)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_fields_with_and_without_type() {
        let mut chunks = Chunks::new("<CALL:8>N0CALL/1 <FREQ:6:N>14.074 <eor>");
        let table = chunks.next().unwrap();
        assert_eq!(table.get("CALL"), Some("N0CALL/1"));
        assert_eq!(table.get("freq"), Some("14.074"));
        assert!(chunks.next().is_none());
    }

    #[test]
    fn tag_names_are_case_insensitive() {
        let table = Chunks::new("<call:5>K1ABC<Gridsquare:4>FN42<EOR>")
            .next()
            .unwrap();
        assert_eq!(table.get("CALL"), Some("K1ABC"));
        assert_eq!(table.get("GRIDSQUARE"), Some("FN42"));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn prefixed_names_do_not_alias() {
        let table = Chunks::new("<MY_GRIDSQUARE:6>JO22ab <eor>").next().unwrap();
        assert_eq!(table.get("GRIDSQUARE"), None);
        assert_eq!(table.get("MY_GRIDSQUARE"), Some("JO22ab"));
    }

    #[test]
    fn header_is_discarded() {
        let content = "PSKreporter export <PROGRAMID:3>PSK <ADIF_VER:5>3.1.0 <EOH>\n\
                       <CALL:5>K1ABC <eor>\n";
        let tables: Vec<_> = Chunks::new(content).collect();
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].get("PROGRAMID"), None);
        assert_eq!(tables[0].len(), 1);
    }

    #[test]
    fn first_occurrence_wins_and_empty_reads_absent() {
        let table = Chunks::new("<SNR:2>-5 <SNR:2>-9 <OPERATOR:0> <eor>")
            .next()
            .unwrap();
        assert_eq!(table.get("SNR"), Some("-5"));
        assert_eq!(table.get("OPERATOR"), None);
    }

    #[test]
    fn malformed_tags_are_skipped() {
        let table = Chunks::new("<CALL>K1ABC <FREQ:x>7.0 <DISTANCE:3>812 <b>bold</b> <eor>")
            .next()
            .unwrap();
        assert_eq!(table.get("CALL"), None);
        assert_eq!(table.get("FREQ"), None);
        assert_eq!(table.get("DISTANCE"), Some("812"));
    }

    #[test]
    fn empty_chunks_and_trailing_fields() {
        let content = "<eor><eor>  <CALL:5>K1ABC <eor>\n<CALL:5>W1AW ";
        let calls: Vec<_> = Chunks::new(content)
            .map(|table| table.get("CALL").unwrap().to_string())
            .collect();
        assert_eq!(calls, ["K1ABC", "W1AW"]);
    }

    #[test]
    fn values_may_span_lines() {
        let table = Chunks::new("<CALL:5>K1ABC\n<FREQ:5>7.074\r\n<EOR>").next().unwrap();
        assert_eq!(table.get("CALL"), Some("K1ABC"));
        assert_eq!(table.get("FREQ"), Some("7.074"));
    }

    #[test]
    fn unterminated_tag_ends_input() {
        let tables: Vec<_> = Chunks::new("<CALL:5>K1ABC <FREQ:5").collect();
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].get("CALL"), Some("K1ABC"));
    }
}
