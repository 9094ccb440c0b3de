use sea_orm::sea_query::{Index, IndexCreateStatement, PostgresQueryBuilder};
use sea_orm::*;
use tracing::info;

use crate::entity::{assignment_questionnaire, participant, question, team};

/// Ensure the composite lookup indexes exist.
///
/// SeaORM's schema-sync doesn't create composite non-unique indexes,
/// so they are created on startup.
pub async fn ensure_indexes(db: &DatabaseConnection) -> Result<(), DbErr> {
    let indexes = [
        // Questions of a questionnaire, in seq order
        Index::create()
            .if_not_exists()
            .name("idx_question_questionnaire_seq")
            .table(question::Entity)
            .col(question::Column::QuestionnaireId)
            .col(question::Column::Seq)
            .to_owned(),
        // Roster lookups by (assignment, user)
        Index::create()
            .if_not_exists()
            .name("idx_participant_assignment_user")
            .table(participant::Entity)
            .col(participant::Column::AssignmentId)
            .col(participant::Column::UserId)
            .to_owned(),
        Index::create()
            .if_not_exists()
            .name("idx_team_assignment")
            .table(team::Entity)
            .col(team::Column::AssignmentId)
            .to_owned(),
        Index::create()
            .if_not_exists()
            .name("idx_assignment_questionnaire_round")
            .table(assignment_questionnaire::Entity)
            .col(assignment_questionnaire::Column::AssignmentId)
            .col(assignment_questionnaire::Column::UsedInRound)
            .to_owned(),
    ];

    for index in indexes {
        create_index(db, index).await;
    }

    Ok(())
}

async fn create_index(db: &DatabaseConnection, index: IndexCreateStatement) {
    let stmt = index.to_string(PostgresQueryBuilder);
    match db.execute_unprepared(&stmt).await {
        Ok(_) => info!("Ensured index exists: {}", stmt),
        Err(e) => tracing::warn!("Failed to create index ({}): {}", stmt, e),
    }
}
