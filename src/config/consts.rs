/// Name of the application component owning the run-wide properties
pub const APP_NAME: &str = "app";
/// Name of the built-in data-flow service
pub const DATAFLOW_NAME: &str = "dataflow";

pub const DATAFLOW_TYPE: &str = "eventloom::DataFlow";
pub const INPUT_STREAM_TYPE: &str = "eventloom::InputStream";
pub const OUTPUT_STREAM_TYPE: &str = "eventloom::OutputStream";

pub const PROP_EVT_MAX: &str = "EvtMax";
pub const PROP_N_PROCS: &str = "NProcs";
pub const PROP_MSG_LEVEL: &str = "MsgLevel";
pub const PROP_DOT_FILE: &str = "DotFile";
pub const PROP_PORTS: &str = "Ports";
pub const PROP_STREAMER: &str = "Streamer";

/// Number of events to process; negative means until the input runs out
pub const DEFAULT_EVT_MAX: i64 = -1;
/// Worker count; zero or negative selects the sequential loop
pub const DEFAULT_N_PROCS: i64 = 0;
pub const DEFAULT_MSG_LEVEL: &str = "INFO";

/// Pending event ids queued per worker in the concurrent loop
pub const INTAKE_DEPTH_PER_WORKER: usize = 100;
