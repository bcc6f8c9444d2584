//! Scenario and property tests spanning the partition, narrow phase and body loop
