use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::io::Cursor;

/// One record as returned by the API. Field order is preserved so the
/// tabular output keeps the source document's column order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    pub fields: serde_json::Map<String, Value>,
}

impl Record {
    /// Returns the field as a number, or `None` when it is absent or not a
    /// JSON number. Numeric-looking strings do not count.
    pub fn numeric_field(&self, name: &str) -> Option<f64> {
        self.fields.get(name).and_then(Value::as_f64)
    }
}

/// In-memory tab-separated output, produced once per run by the transform
/// stage and consumed by the uploader. Behaves like a file handle: the
/// producer leaves the position at end-of-write, readers must rewind first.
#[derive(Debug, Clone)]
pub struct TsvBuffer {
    cursor: Cursor<Vec<u8>>,
}

impl TsvBuffer {
    pub fn from_bytes(data: Vec<u8>) -> Self {
        let end = data.len() as u64;
        let mut cursor = Cursor::new(data);
        cursor.set_position(end);
        Self { cursor }
    }

    /// 重置讀取位置（重試前必須可重複呼叫）
    pub fn rewind(&mut self) {
        self.cursor.set_position(0);
    }

    pub fn position(&self) -> u64 {
        self.cursor.position()
    }

    pub fn len(&self) -> usize {
        self.cursor.get_ref().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cursor.get_ref().is_empty()
    }

    pub fn contents(&self) -> &[u8] {
        self.cursor.get_ref()
    }

    /// Reads everything from the current position to the end, advancing the
    /// position. Yields nothing unless the caller rewound first.
    pub fn read_remaining(&mut self) -> Vec<u8> {
        let data = self.cursor.get_ref();
        let start = (self.cursor.position() as usize).min(data.len());
        let out = data[start..].to_vec();
        let end = self.cursor.get_ref().len() as u64;
        self.cursor.set_position(end);
        out
    }
}

/// SFTP destination for one run. Debug output never exposes the password.
#[derive(Clone)]
pub struct SftpTarget {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub remote_path: String,
}

impl fmt::Debug for SftpTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SftpTarget")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"***")
            .field("remote_path", &self.remote_path)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(value: serde_json::Value) -> Record {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_record_preserves_field_order() {
        let rec = record(serde_json::json!({"price": 30, "id": 1, "name": "A"}));
        let keys: Vec<&String> = rec.fields.keys().collect();
        assert_eq!(keys, ["price", "id", "name"]);
    }

    #[test]
    fn test_numeric_field_accepts_json_numbers_only() {
        let rec = record(serde_json::json!({
            "int": 75,
            "float": 75.5,
            "text": "N/A",
            "numeric_text": "75",
            "flag": true,
            "nothing": null
        }));

        assert_eq!(rec.numeric_field("int"), Some(75.0));
        assert_eq!(rec.numeric_field("float"), Some(75.5));
        assert_eq!(rec.numeric_field("text"), None);
        assert_eq!(rec.numeric_field("numeric_text"), None);
        assert_eq!(rec.numeric_field("flag"), None);
        assert_eq!(rec.numeric_field("nothing"), None);
        assert_eq!(rec.numeric_field("missing"), None);
    }

    #[test]
    fn test_buffer_starts_at_end_of_write() {
        let buffer = TsvBuffer::from_bytes(b"id\tprice\n2\t75\n".to_vec());
        assert_eq!(buffer.position(), buffer.len() as u64);
    }

    #[test]
    fn test_read_remaining_requires_rewind() {
        let mut buffer = TsvBuffer::from_bytes(b"id\tprice\n2\t75\n".to_vec());

        // Fresh buffer sits at the end, so a blind read sees nothing.
        assert!(buffer.read_remaining().is_empty());

        buffer.rewind();
        assert_eq!(buffer.read_remaining(), b"id\tprice\n2\t75\n".to_vec());

        // Rewind is idempotent and repeatable.
        buffer.rewind();
        buffer.rewind();
        assert_eq!(buffer.read_remaining(), b"id\tprice\n2\t75\n".to_vec());
    }

    #[test]
    fn test_sftp_target_debug_redacts_password() {
        let target = SftpTarget {
            host: "demo.example.com".to_string(),
            port: 2222,
            username: "demo".to_string(),
            password: "secret".to_string(),
            remote_path: "/upload/products.txt".to_string(),
        };

        let debug = format!("{:?}", target);
        assert!(!debug.contains("secret"));
        assert!(debug.contains("demo.example.com"));
    }
}
