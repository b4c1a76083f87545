// live network tests only, see tests/run.rs
