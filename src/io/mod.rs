// Purpose - the event ingestion surface: how musical events reach the
// manager. Parsing MIDI bytes into events is the host's concern.

pub mod events;
