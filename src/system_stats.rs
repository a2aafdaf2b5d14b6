use std::time::Duration;
use sysinfo::System;
use tokio::sync::mpsc;

use crate::event::AppEvent;
use crate::store::State;

/// Latest host metrics sample. Doubles as the patch type: the collector
/// always produces a full sample and `apply` reports which fields moved.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StatsState {
    pub cpu_percent: f32,
    pub memory_percent: f32,
    pub load_avg_1: f64,
    pub disk_usage_percent: f32,
}

impl StatsState {
    pub fn format_cpu(&self) -> String {
        format!("CPU {}%", self.cpu_percent as u32)
    }

    pub fn format_memory(&self) -> String {
        format!("MEM {}%", self.memory_percent as u32)
    }

    pub fn format_load(&self) -> String {
        format!("LOAD {:.2}", self.load_avg_1)
    }

    pub fn format_disk(&self) -> String {
        format!("DISK {}%", self.disk_usage_percent as u32)
    }
}

impl State for StatsState {
    type Patch = StatsState;

    fn apply(&mut self, patch: StatsState) -> Vec<String> {
        let mut touched = Vec::new();
        if self.cpu_percent != patch.cpu_percent {
            touched.push("cpu".to_string());
        }
        if self.memory_percent != patch.memory_percent {
            touched.push("memory".to_string());
        }
        if self.load_avg_1 != patch.load_avg_1 {
            touched.push("load".to_string());
        }
        if self.disk_usage_percent != patch.disk_usage_percent {
            touched.push("disk".to_string());
        }
        *self = patch;
        touched
    }
}

pub fn start_stats_collector(event_tx: mpsc::UnboundedSender<AppEvent>, interval_secs: u64) {
    tokio::spawn(async move {
        let mut sys = System::new();
        let interval = Duration::from_secs(interval_secs.max(1));

        loop {
            sys.refresh_cpu_usage();
            sys.refresh_memory();

            // Need a short sleep after refresh_cpu_usage for accurate readings
            tokio::time::sleep(Duration::from_millis(200)).await;
            sys.refresh_cpu_usage();

            let cpu_percent = sys.global_cpu_usage();
            let memory_percent = if sys.total_memory() > 0 {
                (sys.used_memory() as f64 / sys.total_memory() as f64 * 100.0) as f32
            } else {
                0.0
            };

            let load_avg = System::load_average();

            let disk_usage_percent = {
                let disks = sysinfo::Disks::new_with_refreshed_list();
                let mut total_space = 0u64;
                let mut available_space = 0u64;
                for disk in disks.list() {
                    total_space += disk.total_space();
                    available_space += disk.available_space();
                }
                if total_space > 0 {
                    ((total_space - available_space) as f64 / total_space as f64 * 100.0) as f32
                } else {
                    0.0
                }
            };

            let stats = StatsState {
                cpu_percent,
                memory_percent,
                load_avg_1: load_avg.one,
                disk_usage_percent,
            };

            if event_tx.send(AppEvent::SystemStats(stats)).is_err() {
                break;
            }

            tokio::time::sleep(interval.saturating_sub(Duration::from_millis(200))).await;
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_reports_changed_fields() {
        let mut state = StatsState::default();
        let touched = state.apply(StatsState {
            cpu_percent: 12.0,
            memory_percent: 40.0,
            load_avg_1: 0.0,
            disk_usage_percent: 0.0,
        });
        assert_eq!(touched, vec!["cpu".to_string(), "memory".to_string()]);

        // Identical sample touches nothing.
        let touched = state.apply(state);
        assert!(touched.is_empty());
    }

    #[test]
    fn test_format() {
        let stats = StatsState {
            cpu_percent: 42.7,
            memory_percent: 81.2,
            load_avg_1: 1.5,
            disk_usage_percent: 63.0,
        };
        assert_eq!(stats.format_cpu(), "CPU 42%");
        assert_eq!(stats.format_memory(), "MEM 81%");
        assert_eq!(stats.format_load(), "LOAD 1.50");
        assert_eq!(stats.format_disk(), "DISK 63%");
    }
}
