// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! End-to-end tests driving [`QueueLogService`] against a real file on
//! disk, including the degraded paths a live deployment hits: missing
//! log, garbled lines mixed into good ones, and empty windows.

use std::io::Write;
use std::path::PathBuf;

use queuelog::service::QueueLogConfig;
use queuelog::{CallStatus, QueueLogService};
use tempfile::NamedTempFile;

// A morning of traffic on 2024-03-01 (1709251200 = midnight UTC):
// two queues, three agents, one call each of the completed, abandoned,
// and timeout shapes, plus membership churn and one garbled line.
const FIXTURE: &str = "\
1709280000|NONE|NONE|NONE|QUEUESTART|
1709280060|MANAGER|support|SIP/201|ADDMEMBER|
1709280065|MANAGER|support|SIP/202|ADDMEMBER|
1709280070|MANAGER|sales|SIP/301|ADDMEMBER|
1709281000.1|oops|short
1709281000|1709280990.1|support|NONE|ENTERQUEUE||5550001|1
1709281005|1709280990.1|support|SIP/201|CONNECT|5
1709281065|1709280990.1|support|SIP/201|COMPLETEAGENT|5|60|1
1709281200|1709281190.2|support|NONE|ENTERQUEUE||5550002|1
1709281240|1709281190.2|support|NONE|ABANDON|1|40
1709281300|1709281290.3|sales|NONE|ENTERQUEUE||5550003|1
1709281420|1709281290.3|sales|NONE|EXITWITHTIMEOUT||120
1709281500|MANAGER|support|SIP/202|PAUSE|
";

fn service_with(contents: &str) -> (QueueLogService, NamedTempFile) {
    let mut file = NamedTempFile::new().expect("tempfile creation failed");
    file.write_all(contents.as_bytes())
        .expect("tempfile write failed");
    let service = QueueLogService::new(QueueLogConfig {
        log_path: file.path().to_path_buf(),
    });
    (service, file)
}

#[test]
fn calls_reconstructed_across_garbled_lines() {
    let (service, _file) = service_with(FIXTURE);
    let calls = service.calls(None, None, None);

    // QUEUESTART, ADDMEMBER, and PAUSE lines carry no per-call ids worth
    // correlating, but they do produce aggregates; the three real calls
    // must be present with the right statuses.
    let status_of = |id: &str| {
        calls
            .iter()
            .find(|c| c.correlation_id == id)
            .map(|c| c.status)
    };
    assert_eq!(status_of("1709280990.1"), Some(CallStatus::Completed));
    assert_eq!(status_of("1709281190.2"), Some(CallStatus::Abandoned));
    assert_eq!(status_of("1709281290.3"), Some(CallStatus::Timeout));

    let completed = calls
        .iter()
        .find(|c| c.correlation_id == "1709280990.1")
        .expect("completed call present");
    assert_eq!(completed.agent, "201");
    assert_eq!(completed.phone_number, "5550001");
    assert_eq!(completed.wait_time, 5);
    assert_eq!(completed.talk_time, 60);
    assert_eq!(completed.total_time, 65);

    let abandoned = calls
        .iter()
        .find(|c| c.correlation_id == "1709281190.2")
        .expect("abandoned call present");
    assert_eq!(abandoned.wait_time, 40);
    assert_eq!(abandoned.agent, "N/A");
}

#[test]
fn queue_statistics_split_by_queue() {
    let (service, _file) = service_with(FIXTURE);
    let stats = service.queue_statistics(Some("2024-03-01"), Some("2024-03-01"), None);
    assert_eq!(stats.len(), 2);

    let support = stats
        .iter()
        .find(|s| s.queue_name == "support")
        .expect("support queue present");
    assert_eq!(support.total_calls, 2);
    assert_eq!(support.answered_calls, 1);
    assert_eq!(support.abandoned_calls, 1);
    assert_eq!(support.avg_wait_time, 5.0);
    assert_eq!(support.service_level, 100.0);
    assert_eq!(support.answer_rate, 50.0);

    let sales = stats
        .iter()
        .find(|s| s.queue_name == "sales")
        .expect("sales queue present");
    assert_eq!(sales.total_calls, 1);
    assert_eq!(sales.answered_calls, 0);

    let sales_only =
        service.queue_statistics(Some("2024-03-01"), Some("2024-03-01"), Some("sales"));
    assert_eq!(sales_only.len(), 1);
    assert_eq!(sales_only[0].queue_name, "sales");
}

#[test]
fn date_window_excludes_other_days() {
    let (service, _file) = service_with(FIXTURE);
    assert!(service
        .queue_statistics(Some("2024-03-02"), Some("2024-03-02"), None)
        .is_empty());
    assert_eq!(
        service
            .call_summary(Some("2024-02-01"), Some("2024-02-28"), None)
            .total_calls,
        0
    );
}

#[test]
fn listings_cover_queues_and_agents() {
    let (service, _file) = service_with(FIXTURE);

    let queues = service.available_queues();
    assert_eq!(queues.len(), 2);
    assert_eq!(queues[0].queue_name, "sales");
    assert_eq!(queues[0].total_agents, 1);
    assert_eq!(queues[1].queue_name, "support");
    assert_eq!(queues[1].total_agents, 2);

    // Listing looks back a week from the given clock.
    let agents = service.available_agents_at(1709281600);
    let names: Vec<&str> = agents.iter().map(|a| a.agent.as_str()).collect();
    assert_eq!(names, vec!["201", "202", "301"]);
    assert_eq!(agents[0].queues, vec!["support"]);

    // A clock far in the future sees no recent agents.
    assert!(service.available_agents_at(1709281600 + 10 * 24 * 3600).is_empty());
}

#[test]
fn realtime_snapshots_track_trailing_windows() {
    let (service, _file) = service_with(FIXTURE);
    let now = 1709281600;

    // Five minutes back from `now` covers the timeout exit and the pause
    // but not the completed call.
    let queues = service.realtime_queue_status_at(now);
    let support = queues
        .iter()
        .find(|q| q.queue_name == "support")
        .expect("support snapshot present");
    assert_eq!(support.calls_completed_5min, 0);

    let agents = service.realtime_agent_status_at(now);
    let s202 = agents
        .iter()
        .find(|a| a.agent == "202")
        .expect("agent 202 present");
    assert_eq!(s202.status.to_string(), "PAUSED");

    // Thirty minutes back sees agent 201 finishing their call.
    let s201 = agents
        .iter()
        .find(|a| a.agent == "201")
        .expect("agent 201 present");
    assert_eq!(s201.status.to_string(), "AVAILABLE");
    assert_eq!(s201.last_event, "COMPLETEAGENT");
}

#[test]
fn summary_and_distributions_agree_on_volume() {
    let (service, _file) = service_with(FIXTURE);

    let summary = service.call_summary(None, None, None);
    assert_eq!(summary.total_calls, 3);
    assert_eq!(summary.answered_calls, 1);
    assert_eq!(summary.abandoned_calls, 1);
    assert_eq!(summary.answer_rate, 33.33);

    let daily = service.daily_summary(None, None);
    assert_eq!(daily.len(), 1);
    assert_eq!(daily[0].date, "2024-03-01");
    assert_eq!(daily[0].total_calls, 3);

    let hourly = service.hourly_distribution(None, None);
    let volume: u64 = hourly.iter().map(|h| h.total_calls).sum();
    assert_eq!(volume, 3);

    let dispositions = service.disposition_summary(None, None);
    let total: u64 = dispositions.iter().map(|d| d.count).sum();
    // Every parseable line is counted, including the unknown QUEUESTART.
    assert_eq!(total, 12);
    assert!(dispositions.iter().any(|d| d.event == "QUEUESTART"));
}

#[test]
fn missing_log_degrades_to_empty_results() {
    let service = QueueLogService::new(QueueLogConfig {
        log_path: PathBuf::from("/definitely/not/a/queue_log"),
    });

    let health = service.health();
    assert!(health.is_degraded());
    assert!(!health.exists);

    assert!(service.calls(None, None, None).is_empty());
    assert!(service.available_queues().is_empty());
    assert!(service.realtime_agent_status().is_empty());
    assert_eq!(service.calls_by_agent(None, None, None).total_agents, 0);
}

#[test]
fn agent_views_agree_with_each_other() {
    let (service, _file) = service_with(FIXTURE);

    let stats = service.agent_statistics(None, None, None);
    assert_eq!(stats.len(), 1);
    assert_eq!(stats[0].agent, "201");
    assert_eq!(stats[0].total_calls, 1);
    assert_eq!(stats[0].completed_calls, 1);
    assert_eq!(stats[0].total_talk_time, 60);

    let comparison = service.agent_comparison(None, None);
    assert_eq!(comparison[0].rank, 1);
    assert_eq!(comparison[0].efficiency, 100.0);

    let by_queue = service.agent_performance_by_queue(None, None, "201");
    assert_eq!(by_queue.len(), 1);
    assert_eq!(by_queue[0].queue_name, "support");
    assert_eq!(by_queue[0].calls_answered, 1);

    let history = service.agent_call_history(None, None, "201", None);
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].event, "COMPLETEAGENT");

    let grouped = service.calls_by_agent(None, None, None);
    assert_eq!(grouped.total_agents, 1);
    assert_eq!(grouped.agents[0].total_talk_time, 60);
}
