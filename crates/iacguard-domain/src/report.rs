use iacguard_types::{ReportData, ScanResult, StatusCounts};

#[derive(Clone, Debug)]
pub struct DomainReport {
    pub results: Vec<ScanResult>,
    pub data: ReportData,
}

impl DomainReport {
    pub fn counts(&self) -> &StatusCounts {
        &self.data.counts
    }

    pub fn has_failures(&self) -> bool {
        self.data.counts.failed > 0
    }
}
