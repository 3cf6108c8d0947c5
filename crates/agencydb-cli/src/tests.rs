use agencydb_core::{
    CollaborationStatus, CollaborationStore, InMemoryStore, NewCollaboration, NewProposal,
    ProposalStore, RevenueFilter, RevenueStore,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::*;

#[test]
fn parses_db_ping_command() {
    let cli =
        Cli::try_parse_from(["agencydb-cli", "db", "ping"]).expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Db {
            command: DbCommands::Ping
        })
    ));
}

#[test]
fn parses_db_migrate_command() {
    let cli =
        Cli::try_parse_from(["agencydb-cli", "db", "migrate"]).expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Db {
            command: DbCommands::Migrate
        })
    ));
}

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["agencydb-cli"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
}

#[test]
fn parses_pipeline_move_with_stage() {
    let id = Uuid::new_v4().to_string();
    let cli = Cli::try_parse_from([
        "agencydb-cli",
        "pipeline",
        "move",
        "--proposal",
        &id,
        "--stage",
        "NEGOTIATING",
    ])
    .expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Pipeline {
            command: PipelineCommands::Move {
                stage: agencydb_core::ProposalStage::Negotiating,
                ..
            }
        })
    ));
}

#[test]
fn rejects_unknown_stage() {
    let id = Uuid::new_v4().to_string();
    let result = Cli::try_parse_from([
        "agencydb-cli",
        "pipeline",
        "move",
        "--proposal",
        &id,
        "--stage",
        "won",
    ]);
    assert!(result.is_err());
}

#[test]
fn rejects_malformed_proposal_id() {
    let result = Cli::try_parse_from(["agencydb-cli", "pipeline", "convert", "--proposal", "42"]);
    assert!(result.is_err());
}

#[test]
fn parses_revenue_resync_dry_run() {
    let cli = Cli::try_parse_from(["agencydb-cli", "revenue", "resync", "--dry-run"])
        .expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Some(Commands::Revenue {
            command: RevenueCommands::Resync { dry_run: true }
        })
    ));

    let cli = Cli::try_parse_from(["agencydb-cli", "revenue", "resync"])
        .expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Some(Commands::Revenue {
            command: RevenueCommands::Resync { dry_run: false }
        })
    ));
}

#[tokio::test]
async fn pipeline_commands_report_moves_and_conversions() {
    let store = InMemoryStore::new();
    let proposal = store
        .insert_proposal(NewProposal::named("Acme"))
        .await
        .expect("insert_proposal failed");

    let moved = pipeline::run_move(&store, proposal.id, agencydb_core::ProposalStage::Won)
        .await
        .expect("move failed");
    assert_eq!(moved, "Acme: TO_CONTACT -> WON");

    let again = pipeline::run_move(&store, proposal.id, agencydb_core::ProposalStage::Won)
        .await
        .expect("move failed");
    assert_eq!(again, "Acme already in WON");

    let created = pipeline::run_convert(&store, proposal.id)
        .await
        .expect("convert failed");
    assert!(created.starts_with("created brand Acme"));
    let existing = pipeline::run_convert(&store, proposal.id)
        .await
        .expect("convert failed");
    assert!(existing.starts_with("brand Acme already exists"));

    let stats = pipeline::run_stats(&store).await.expect("stats failed");
    assert_eq!(stats[0], "proposals: 1 (0 urgent)");
    assert!(stats.iter().any(|line| line.contains("WON")));
    assert!(stats.iter().all(|line| !line.ends_with('\n')));
}

#[tokio::test]
async fn move_of_unknown_proposal_fails() {
    let store = InMemoryStore::new();
    let result =
        pipeline::run_move(&store, Uuid::new_v4(), agencydb_core::ProposalStage::Lost).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn resync_dry_run_leaves_the_ledger_alone() {
    let store = InMemoryStore::new();
    store
        .insert_collaboration(NewCollaboration {
            status: CollaborationStatus::Completed,
            is_paid: true,
            payment_amount: Decimal::new(500, 0),
            contract_signed_date: NaiveDate::from_ymd_opt(2024, 3, 15),
            ..NewCollaboration::new(Uuid::new_v4(), "Acme")
        })
        .await
        .expect("insert_collaboration failed");

    revenue::run(&store, RevenueCommands::Resync { dry_run: true })
        .await
        .expect("dry run failed");
    assert!(store
        .find_revenue(&RevenueFilter::default())
        .await
        .expect("find_revenue failed")
        .is_empty());

    revenue::run(&store, RevenueCommands::Resync { dry_run: false })
        .await
        .expect("resync failed");
    assert_eq!(
        store
            .find_revenue(&RevenueFilter::default())
            .await
            .expect("find_revenue failed")
            .len(),
        1
    );
}

#[test]
fn empty_discrepancy_list_says_so() {
    assert_eq!(revenue::render_discrepancies(&[]), vec!["no discrepancies"]);
}

#[test]
fn discrepancies_render_one_line_per_month() {
    let creator_id = Uuid::new_v4();
    let found = vec![agencydb_core::Discrepancy {
        creator_id,
        month: agencydb_core::YearMonth::new(2024, 3).expect("valid month"),
        auto_total: Decimal::new(500, 0),
        manual_total: Decimal::new(200, 0),
    }];

    let lines = revenue::render_discrepancies(&found);

    assert_eq!(
        lines,
        vec![
            "1 discrepancies:".to_string(),
            format!("  2024-03 creator {creator_id} synced 500 manual 200"),
        ]
    );
}

#[test]
fn resync_report_lists_failures_under_the_summary() {
    let failed = Uuid::new_v4();
    let report = agencydb_core::ResyncReport {
        dry_run: true,
        scanned: 2,
        unchanged: 1,
        failures: vec![agencydb_core::ResyncFailure {
            collaboration_id: failed,
            reason: "missing contract date".to_string(),
        }],
        ..agencydb_core::ResyncReport::default()
    };

    let lines = revenue::render_resync(&report);

    assert_eq!(lines.len(), 2);
    assert_eq!(
        lines[0],
        "dry-run: scanned 2 collaborations: 0 created, 0 updated, 0 removed, 1 unchanged"
    );
    assert_eq!(lines[1], format!("  failed {failed}: missing contract date"));
}
