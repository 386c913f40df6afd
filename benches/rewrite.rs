//! Benchmarks for autolink-engine
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use autolink_engine::resolver::StaticResolver;
use autolink_engine::{Autolinker, BoundaryOptions, CompiledRule, Post, Rule};

fn jira_rule() -> Rule {
    Rule {
        name: "Jira".to_string(),
        pattern: r"(?P<key>MM-\d+)".to_string(),
        template: "[${key}](https://mattermost.atlassian.net/browse/${key})".to_string(),
        process_bot_posts: true,
        ..Default::default()
    }
}

fn message() -> String {
    "Deployed the fix for MM-12345 and MM-54321 to staging. \
     See [the runbook](https://example.com/runbook) and `kubectl get pods` \
     before closing MM-99. More context in the thread."
        .to_string()
}

/// Benchmark compiling a rule
fn bench_compile(c: &mut Criterion) {
    let rule = jira_rule();
    let boundaries = BoundaryOptions::default();

    c.bench_function("compile_rule", |b| {
        b.iter(|| black_box(CompiledRule::compile(black_box(&rule), &boundaries).unwrap()))
    });
}

/// Benchmark the iterative (capturing-boundary) substitution
fn bench_replace_iterative(c: &mut Criterion) {
    let compiled = CompiledRule::compile(&jira_rule(), &BoundaryOptions::default()).unwrap();
    let text = message();

    c.bench_function("replace_iterative", |b| {
        b.iter(|| black_box(compiled.replace(black_box(&text))))
    });
}

/// Benchmark the single-pass (word-match) substitution
fn bench_replace_single_pass(c: &mut Criterion) {
    let rule = Rule {
        word_match: true,
        ..jira_rule()
    };
    let compiled = CompiledRule::compile(&rule, &BoundaryOptions::default()).unwrap();
    let text = message();

    c.bench_function("replace_single_pass", |b| {
        b.iter(|| black_box(compiled.replace(black_box(&text))))
    });
}

/// Benchmark a full message rewrite including the markdown traversal
fn bench_process_post(c: &mut Criterion) {
    let engine = Autolinker::new(BoundaryOptions::default());
    engine.update_rules(&[jira_rule()]);
    let resolver = StaticResolver::default();
    let post = Post {
        message: message(),
        channel_id: "channel1".to_string(),
        user_id: "user1".to_string(),
        hashtags: String::new(),
    };

    c.bench_function("process_post", |b| {
        b.iter(|| black_box(engine.process_post(black_box(&post), &resolver, &resolver)))
    });
}

/// Benchmark a message that does not match any rule
fn bench_process_post_no_match(c: &mut Criterion) {
    let engine = Autolinker::new(BoundaryOptions::default());
    engine.update_rules(&[jira_rule()]);
    let resolver = StaticResolver::default();
    let post = Post {
        message: "nothing relevant in this message at all".to_string(),
        channel_id: "channel1".to_string(),
        user_id: "user1".to_string(),
        hashtags: String::new(),
    };

    c.bench_function("process_post_no_match", |b| {
        b.iter(|| black_box(engine.process_post(black_box(&post), &resolver, &resolver)))
    });
}

criterion_group!(
    benches,
    bench_compile,
    bench_replace_iterative,
    bench_replace_single_pass,
    bench_process_post,
    bench_process_post_no_match,
);

criterion_main!(benches);
