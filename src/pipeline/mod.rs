pub mod extraction;
pub mod structuring;
pub mod batch; // Quarterly report batch: PDF → metrics → summary
