//! End-to-end tests: benchmark file on disk → parser → loader → memory store.

use std::io::Write;

use tsload_common::{Error, TagId};
use tsload_ingest::{
    parse_file, rows_per_batch, LoadOptions, Loader, MemoryStore, Value, TAG_KEYS,
};

fn tag_line(ordinal: usize, host: usize) -> String {
    format!(
        "{ordinal},hostname=host_{host},region=eu-west-1,datacenter=eu-west-1b,rack=5,\
         os=Ubuntu16.04LTS,arch=x64,team=NYC,service=9,service_version=1,service_environment=test"
    )
}

fn write_input(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

/// `hosts` hosts each reporting `samples` cpu and mem samples, one second apart.
fn synthetic_input(hosts: usize, samples: usize) -> String {
    let mut out = String::from("tsbs timescaledb format\n");
    out.push_str("cpu,usage_user,usage_system,usage_idle,usage_nice,usage_iowait\n");
    out.push_str("mem,total,used\n\n");
    let mut ordinal = 0;
    for s in 0..samples {
        let ts = 1_451_606_400_000_000_000u64 + s as u64 * 1_000_000_000;
        for h in 0..hosts {
            ordinal += 1;
            out.push_str(&tag_line(ordinal, h));
            out.push('\n');
            out.push_str(&format!("cpu,{ts},{s},{h},1,2,3\n"));
            ordinal += 1;
            out.push_str(&tag_line(ordinal, h));
            out.push('\n');
            out.push_str(&format!("mem,{ts},1024,{s}\n"));
        }
    }
    out
}

#[test]
fn single_record_lands_in_store() {
    let file = write_input(&format!(
        "header\ncpu,usage_user,usage_system\n\n{}\ncpu,1451606400000000000,58.5,2.2\n",
        tag_line(1, 0)
    ));

    let mut loader = Loader::new(MemoryStore::new(), LoadOptions::default());
    let summary = loader.run(file.path()).unwrap();
    assert_eq!(summary.tags, 1);
    assert_eq!(summary.total_rows, 1);

    let store = loader.into_store();
    assert_eq!(store.pings(), 1);
    let cpu = store.rows_for("cpu");
    let rendered: Vec<String> = cpu[0].iter().map(ToString::to_string).collect();
    assert_eq!(
        rendered,
        vec!["2016-01-01", "2016-01-01 00:00:00", "1", "58.5", "2.2"]
    );

    let tags = store.rows_for("tags");
    assert_eq!(tags.len(), 1);
    assert_eq!(tags[0].len(), 2 + TAG_KEYS.len());
    assert_eq!(tags[0][0].to_string(), "2016-01-01");
    assert_eq!(tags[0][1], Value::UInt64(1));
}

#[test]
fn repeated_hosts_share_tag_ids() {
    let file = write_input(&synthetic_input(3, 4));
    let parsed = parse_file(file.path()).unwrap();

    assert_eq!(parsed.tags.len(), 3);
    let ids: Vec<TagId> = parsed.queue.rows("cpu").iter().map(|r| r.tags_id).collect();
    assert_eq!(ids[..3], [TagId(1), TagId(2), TagId(3)]);
    assert_eq!(ids[3..6], [TagId(1), TagId(2), TagId(3)]);
    assert_eq!(parsed.queue.rows("mem")[0].tags_id, TagId(1));
}

#[test]
fn batches_reproduce_queue_in_order() {
    let file = write_input(&synthetic_input(5, 20));
    let parsed = parse_file(file.path()).unwrap();
    // 5 cpu columns * 8 bytes * 7 rows.
    let budget = 5 * 8 * 7;
    let options = LoadOptions {
        batch_budget_bytes: budget,
        ..LoadOptions::default()
    };

    let mut loader = Loader::new(MemoryStore::new(), options);
    let summary = loader.load_parsed(&parsed).unwrap();
    let store = loader.into_store();

    let cpu_stats = summary.metrics.iter().find(|m| m.metric == "cpu").unwrap();
    assert_eq!(cpu_stats.rows_per_batch, rows_per_batch(budget, 5));
    assert_eq!(cpu_stats.rows_per_batch, 7);
    assert_eq!(cpu_stats.batches, 100_usize.div_ceil(7));

    let sent = store.rows_for("cpu");
    let queued = parsed.queue.rows("cpu");
    assert_eq!(sent.len(), queued.len());
    for (sent, queued) in sent.iter().zip(queued) {
        assert_eq!(sent.to_vec(), queued.to_values());
    }
    for batch in store.batches_for("cpu") {
        assert!(batch.row_count <= 7);
    }
}

#[test]
fn parse_failure_touches_nothing() {
    let file = write_input(&format!(
        "header\ncpu,a\n\n{}\ncpu,1451606400000000000,oops\n",
        tag_line(1, 0)
    ));
    let mut loader = Loader::new(MemoryStore::new(), LoadOptions::default());
    let err = loader.run(file.path()).unwrap_err();
    assert!(matches!(err, Error::Parse { line: 5, .. }));
    assert!(loader.store().statements().is_empty());
    assert!(loader.store().batches().is_empty());
}

#[test]
fn store_failure_aborts_run() {
    let file = write_input(&synthetic_input(2, 3));
    // Send 0 is the tags batch, send 1 the first cpu batch.
    let mut loader = Loader::new(MemoryStore::new().fail_on_send(1), LoadOptions::default());
    let err = loader.run(file.path()).unwrap_err();
    assert_eq!(err.code(), 40);
    assert_eq!(loader.store().batches().len(), 1);
}

#[test]
fn parsing_is_deterministic() {
    let input = synthetic_input(4, 6);
    let a = tsload_ingest::parse_reader(input.as_bytes()).unwrap();
    let b = tsload_ingest::parse_reader(input.as_bytes()).unwrap();
    let tags_a: Vec<_> = a.tags.iter().map(|(id, t)| (id, t.clone())).collect();
    let tags_b: Vec<_> = b.tags.iter().map(|(id, t)| (id, t.clone())).collect();
    assert_eq!(tags_a, tags_b);
    assert_eq!(a.queue.rows("cpu"), b.queue.rows("cpu"));
    assert_eq!(a.queue.rows("mem"), b.queue.rows("mem"));
}
