pub mod report_source;
