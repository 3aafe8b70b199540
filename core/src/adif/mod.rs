//! ADIF record model and parser.

pub mod band;
pub mod fields;
pub mod parser;
pub mod record;

pub use band::Band;
pub use fields::{Chunks, FieldTable};
pub use parser::{parse_record, LogParser, Records};
pub use record::{AntennaId, Record, RecordRejection};
