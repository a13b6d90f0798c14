mod analysis_result;
mod analyzer;

pub use analysis_result::AnalysisResult;
pub use analyzer::Analyzer;
