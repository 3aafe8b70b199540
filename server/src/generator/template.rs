//! ADIF text fragments.

pub const END_OF_HEADER: &str = "<EOH>\n";
pub const END_OF_RECORD: &str = "<eor>\n";

/// `<NAME:len>value` followed by a separating space.
pub fn field(name: &str, value: &str) -> String {
    format!("<{}:{}>{} ", name, value.len(), value)
}

pub fn header(program: &str) -> String {
    let mut text = format!("{} export\n", program);
    text.push_str(&field("ADIF_VER", "3.1.4"));
    text.push_str(&field("PROGRAMID", program));
    text.push_str(END_OF_HEADER);
    text
}

pub fn record(fields: &[(&str, String)]) -> String {
    let mut text: String = fields.iter().map(|(name, value)| field(name, value)).collect();
    text.push_str(END_OF_RECORD);
    text
}
