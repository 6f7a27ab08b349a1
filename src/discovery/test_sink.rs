//! In-memory [`AdapterSink`] for scanner tests.

use std::sync::Mutex;

use super::AdapterSink;
use crate::adapter::AdapterRecord;

#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<AdapterRecord>>,
    loopback: Mutex<Option<String>>,
}

impl MemorySink {
    pub fn records(&self) -> Vec<AdapterRecord> {
        self.records.lock().unwrap().clone()
    }

    pub fn names(&self) -> Vec<String> {
        self.records().into_iter().map(|r| r.name).collect()
    }

    pub fn get(&self, name: &str) -> Option<AdapterRecord> {
        self.records().into_iter().find(|r| r.name == name)
    }
}

impl AdapterSink for MemorySink {
    fn contains(&self, name: &str) -> bool {
        self.records.lock().unwrap().iter().any(|r| r.name == name)
    }

    fn insert(&self, record: AdapterRecord) -> bool {
        let mut records = self.records.lock().unwrap();
        if records.iter().any(|r| r.name == record.name) {
            return false;
        }
        records.push(record);
        true
    }

    fn loopback_name(&self) -> Option<String> {
        self.loopback.lock().unwrap().clone()
    }

    fn set_loopback_name(&self, name: &str) {
        *self.loopback.lock().unwrap() = Some(name.to_string());
    }
}
