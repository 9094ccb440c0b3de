use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use serde_json::json;

use review_server::entity::{participant, team, tree_node};

use crate::common::{TestApp, routes};

/// Create an assignment as a fresh instructor and return `(instructor_id, token, assignment_id)`.
async fn setup_assignment(app: &TestApp, body: serde_json::Value) -> (i32, String, i32) {
    let (instructor_id, token) = app.create_instructor("instructor1").await;
    let id = app.create_assignment(&token, body).await;
    (instructor_id, token, id)
}

/// Insert one question under a questionnaire via the API.
async fn add_question(app: &TestApp, token: &str, questionnaire_id: i32, txt: &str, weight: i32) {
    let res = app
        .post_with_token(
            routes::QUESTIONS,
            &json!({
                "questionnaire_id": questionnaire_id,
                "txt": txt,
                "question_type": "Criterion",
                "break_before": true,
                "weight": weight,
            }),
            token,
        )
        .await;
    assert_eq!(res.status, 201, "add_question failed: {}", res.text);
}

mod assignment_creation {
    use super::*;

    #[tokio::test]
    async fn instructor_can_create_an_assignment() {
        let app = TestApp::spawn().await;
        let (_, token) = app.create_instructor("instructor1").await;

        let res = app
            .post_with_token(
                routes::ASSIGNMENTS,
                &json!({
                    "title": "Program 1",
                    "description": "Write a parser",
                    "max_team_size": 3,
                }),
                &token,
            )
            .await;

        assert_eq!(res.status, 201);
        assert_eq!(res.body["title"], "Program 1");
        assert_eq!(res.body["max_team_size"], 3);
        assert_eq!(res.body["course_id"], serde_json::Value::Null);
        assert_eq!(res.body["has_badge"], false);
        assert!(res.body["id"].is_number());
        assert!(res.body["created_at"].is_string());
    }

    #[tokio::test]
    async fn blank_title_is_rejected_with_field_errors() {
        let app = TestApp::spawn().await;
        let (_, token) = app.create_instructor("instructor1").await;

        let res = app
            .post_with_token(routes::ASSIGNMENTS, &json!({"title": "   "}), &token)
            .await;

        assert_eq!(res.status, 422);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
        assert!(res.body["errors"]["title"].is_array());
    }

    #[tokio::test]
    async fn non_positive_team_size_is_rejected() {
        let app = TestApp::spawn().await;
        let (_, token) = app.create_instructor("instructor1").await;

        let res = app
            .post_with_token(
                routes::ASSIGNMENTS,
                &json!({"title": "Program 1", "max_team_size": 0}),
                &token,
            )
            .await;

        assert_eq!(res.status, 422);
        assert!(res.body["errors"]["max_team_size"].is_array());
    }

    #[tokio::test]
    async fn trims_title_on_create() {
        let app = TestApp::spawn().await;
        let (_, token) = app.create_instructor("instructor1").await;

        let res = app
            .post_with_token(routes::ASSIGNMENTS, &json!({"title": "  Program 1  "}), &token)
            .await;

        assert_eq!(res.status, 201);
        assert_eq!(res.body["title"], "Program 1");
    }
}

mod assignment_retrieval {
    use super::*;

    #[tokio::test]
    async fn lists_assignments_in_id_order() {
        let app = TestApp::spawn().await;
        let (_, token) = app.create_instructor("instructor1").await;
        let first = app.create_assignment(&token, json!({"title": "A"})).await;
        let second = app.create_assignment(&token, json!({"title": "B"})).await;

        let res = app.get_with_token(routes::ASSIGNMENTS, &token).await;

        assert_eq!(res.status, 200);
        let ids: Vec<i64> = res
            .body
            .as_array()
            .expect("array body")
            .iter()
            .map(|a| a["id"].as_i64().unwrap())
            .collect();
        assert_eq!(ids, vec![first as i64, second as i64]);
    }

    #[tokio::test]
    async fn returns_not_found_for_nonexistent_assignment() {
        let app = TestApp::spawn().await;
        let (_, token) = app.create_instructor("instructor1").await;

        let res = app.get_with_token(&routes::assignment(9999), &token).await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["message"], "Assignment not found");
    }

    #[tokio::test]
    async fn non_numeric_id_is_not_found() {
        let app = TestApp::spawn().await;
        let (_, token) = app.create_instructor("instructor1").await;

        let res = app.get_with_token("/api/v1/assignments/abc", &token).await;

        assert_eq!(res.status, 404);
    }
}

mod assignment_update {
    use super::*;

    #[tokio::test]
    async fn patch_updates_only_given_fields() {
        let app = TestApp::spawn().await;
        let (_, token, id) =
            setup_assignment(&app, json!({"title": "Program 1", "description": "keep"})).await;

        let res = app
            .patch_with_token(&routes::assignment(id), &json!({"has_badge": true}), &token)
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["has_badge"], true);
        assert_eq!(res.body["title"], "Program 1");
        assert_eq!(res.body["description"], "keep");
    }

    #[tokio::test]
    async fn put_behaves_like_patch_and_can_clear_description() {
        let app = TestApp::spawn().await;
        let (_, token, id) =
            setup_assignment(&app, json!({"title": "Program 1", "description": "old"})).await;

        let res = app
            .put_with_token(
                &routes::assignment(id),
                &json!({"title": "Program 2", "description": null}),
                &token,
            )
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["title"], "Program 2");
        assert_eq!(res.body["description"], serde_json::Value::Null);
    }

    #[tokio::test]
    async fn empty_patch_returns_current_assignment() {
        let app = TestApp::spawn().await;
        let (_, token, id) = setup_assignment(&app, json!({"title": "Program 1"})).await;

        let res = app
            .patch_with_token(&routes::assignment(id), &json!({}), &token)
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["title"], "Program 1");
    }

    #[tokio::test]
    async fn invalid_update_is_rejected_and_not_persisted() {
        let app = TestApp::spawn().await;
        let (_, token, id) = setup_assignment(&app, json!({"title": "Program 1"})).await;

        let res = app
            .patch_with_token(&routes::assignment(id), &json!({"title": ""}), &token)
            .await;
        assert_eq!(res.status, 422);

        let current = app.get_with_token(&routes::assignment(id), &token).await;
        assert_eq!(current.body["title"], "Program 1");
    }

    #[tokio::test]
    async fn returns_not_found_for_nonexistent_assignment() {
        let app = TestApp::spawn().await;
        let (_, token) = app.create_instructor("instructor1").await;

        let res = app
            .patch_with_token(&routes::assignment(9999), &json!({"title": "x"}), &token)
            .await;

        assert_eq!(res.status, 404);
    }
}

mod assignment_deletion {
    use super::*;

    #[tokio::test]
    async fn instructor_can_delete_an_assignment() {
        let app = TestApp::spawn().await;
        let (_, token, id) = setup_assignment(&app, json!({"title": "Program 1"})).await;

        let res = app.delete_with_token(&routes::assignment(id), &token).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["message"], "Assignment deleted successfully!");

        let get = app.get_with_token(&routes::assignment(id), &token).await;
        assert_eq!(get.status, 404);
    }

    #[tokio::test]
    async fn deletes_participants_teams_and_nodes() {
        let app = TestApp::spawn().await;
        let (instructor_id, token, id) =
            setup_assignment(&app, json!({"title": "Program 1"})).await;
        let student_id = app.insert_user("student1").await;

        let add = app
            .post_empty_with_token(&routes::add_participant(id, student_id), &token)
            .await;
        assert_eq!(add.status, 200, "add_participant failed: {}", add.text);

        let team_id = app.insert_team(id, "Team 1").await;
        app.add_team_member(team_id, student_id).await;
        let topic_id = app.insert_topic(id, "Parsers").await;
        app.sign_up_team(team_id, topic_id).await;
        let questionnaire_id = app.insert_questionnaire("Rubric", instructor_id).await;
        app.link_questionnaire(id, questionnaire_id, Some(1)).await;
        let node = app
            .post_empty_with_token(&routes::assignment_action(id, "create_node"), &token)
            .await;
        assert_eq!(node.status, 200);

        let res = app.delete_with_token(&routes::assignment(id), &token).await;
        assert_eq!(res.status, 200, "delete failed: {}", res.text);

        let participants = participant::Entity::find()
            .filter(participant::Column::AssignmentId.eq(id))
            .count(&app.db)
            .await
            .unwrap();
        assert_eq!(participants, 0);
        let teams = team::Entity::find()
            .filter(team::Column::AssignmentId.eq(id))
            .count(&app.db)
            .await
            .unwrap();
        assert_eq!(teams, 0);
        let nodes = tree_node::Entity::find()
            .filter(tree_node::Column::NodeType.eq(tree_node::ASSIGNMENT_NODE))
            .filter(tree_node::Column::NodeObjectId.eq(id))
            .count(&app.db)
            .await
            .unwrap();
        assert_eq!(nodes, 0);

        // The rubric itself survives; only the link is removed.
        let questions = app
            .get_with_token(&routes::questions_of(questionnaire_id), &token)
            .await;
        assert_eq!(questions.status, 200);
    }

    #[tokio::test]
    async fn student_cannot_delete_an_assignment() {
        let app = TestApp::spawn().await;
        let (_, _, id) = setup_assignment(&app, json!({"title": "Program 1"})).await;
        let (_, student_token) = app.create_student("student1").await;

        let res = app
            .delete_with_token(&routes::assignment(id), &student_token)
            .await;

        assert_eq!(res.status, 403);
    }

    #[tokio::test]
    async fn returns_not_found_for_nonexistent_assignment() {
        let app = TestApp::spawn().await;
        let (_, token) = app.create_instructor("instructor1").await;

        let res = app.delete_with_token(&routes::assignment(9999), &token).await;

        assert_eq!(res.status, 404);
    }
}

mod assignment_participants {
    use super::*;

    #[tokio::test]
    async fn adds_a_user_as_participant() {
        let app = TestApp::spawn().await;
        let (_, token, id) = setup_assignment(&app, json!({"title": "Program 1"})).await;
        let student_id = app.insert_user("student1").await;

        let res = app
            .post_empty_with_token(&routes::add_participant(id, student_id), &token)
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["assignment_id"], id);
        assert_eq!(res.body["user_id"], student_id);
        assert_eq!(res.body["handle"], "student1");
    }

    #[tokio::test]
    async fn rejects_unknown_user() {
        let app = TestApp::spawn().await;
        let (_, token, id) = setup_assignment(&app, json!({"title": "Program 1"})).await;

        let res = app
            .post_empty_with_token(&routes::add_participant(id, 9999), &token)
            .await;

        assert_eq!(res.status, 422);
        assert!(res.body["errors"]["user_id"].is_array());
    }

    #[tokio::test]
    async fn non_numeric_user_id_is_a_validation_error() {
        let app = TestApp::spawn().await;
        let (_, token, id) = setup_assignment(&app, json!({"title": "Program 1"})).await;

        for action in ["add_participant", "remove_participant"] {
            let path = format!("{}?user_id=abc", routes::assignment_action(id, action));
            let res = app.post_empty_with_token(&path, &token).await;

            assert_eq!(res.status, 422, "{action}: {}", res.text);
            assert_eq!(res.body["code"], "VALIDATION_ERROR", "{action}");
        }
    }

    #[tokio::test]
    async fn rejects_missing_user_id() {
        let app = TestApp::spawn().await;
        let (_, token, id) = setup_assignment(&app, json!({"title": "Program 1"})).await;

        let res = app
            .post_empty_with_token(&routes::assignment_action(id, "add_participant"), &token)
            .await;

        assert_eq!(res.status, 422);
    }

    #[tokio::test]
    async fn rejects_duplicate_participant() {
        let app = TestApp::spawn().await;
        let (_, token, id) = setup_assignment(&app, json!({"title": "Program 1"})).await;
        let student_id = app.insert_user("student1").await;

        let first = app
            .post_empty_with_token(&routes::add_participant(id, student_id), &token)
            .await;
        assert_eq!(first.status, 200);

        let res = app
            .post_empty_with_token(&routes::add_participant(id, student_id), &token)
            .await;
        assert_eq!(res.status, 422);
    }

    #[tokio::test]
    async fn add_to_nonexistent_assignment_is_not_found() {
        let app = TestApp::spawn().await;
        let (_, token) = app.create_instructor("instructor1").await;
        let student_id = app.insert_user("student1").await;

        let res = app
            .post_empty_with_token(&routes::add_participant(9999, student_id), &token)
            .await;

        assert_eq!(res.status, 404);
    }

    #[tokio::test]
    async fn add_then_remove_leaves_no_membership() {
        let app = TestApp::spawn().await;
        let (_, token, id) = setup_assignment(&app, json!({"title": "Program 1"})).await;
        let student_id = app.insert_user("student1").await;

        let add = app
            .post_empty_with_token(&routes::add_participant(id, student_id), &token)
            .await;
        assert_eq!(add.status, 200);

        let res = app
            .post_empty_with_token(&routes::remove_participant(id, student_id), &token)
            .await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body["message"], "Participant removed successfully!");

        let remaining = participant::Entity::find()
            .filter(participant::Column::AssignmentId.eq(id))
            .filter(participant::Column::UserId.eq(student_id))
            .count(&app.db)
            .await
            .unwrap();
        assert_eq!(remaining, 0);
    }

    #[tokio::test]
    async fn remove_unknown_user_is_not_found() {
        let app = TestApp::spawn().await;
        let (_, token, id) = setup_assignment(&app, json!({"title": "Program 1"})).await;

        let res = app
            .post_empty_with_token(&routes::remove_participant(id, 9999), &token)
            .await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["message"], "User not found");
    }

    #[tokio::test]
    async fn remove_from_nonexistent_assignment_is_not_found() {
        let app = TestApp::spawn().await;
        let (_, token) = app.create_instructor("instructor1").await;
        let student_id = app.insert_user("student1").await;

        let res = app
            .post_empty_with_token(&routes::remove_participant(9999, student_id), &token)
            .await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["message"], "Assignment not found");
    }
}

mod assignment_courses {
    use super::*;

    #[tokio::test]
    async fn assigns_and_removes_a_course() {
        let app = TestApp::spawn().await;
        let (_, token, id) = setup_assignment(&app, json!({"title": "Program 1"})).await;
        let course_id = app.insert_course("CSC 517").await;

        let res = app
            .patch_empty_with_token(&routes::assign_course(id, course_id), &token)
            .await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body["course_id"], course_id);

        let res = app
            .patch_empty_with_token(
                &routes::assignment_action(id, "remove_assignment_from_course"),
                &token,
            )
            .await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body["course_id"], serde_json::Value::Null);

        let current = app.get_with_token(&routes::assignment(id), &token).await;
        assert_eq!(current.body["course_id"], serde_json::Value::Null);
    }

    #[tokio::test]
    async fn assigning_unknown_course_is_not_found() {
        let app = TestApp::spawn().await;
        let (_, token, id) = setup_assignment(&app, json!({"title": "Program 1"})).await;

        let res = app
            .patch_empty_with_token(&routes::assign_course(id, 9999), &token)
            .await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["message"], "Course not found");
    }

    #[tokio::test]
    async fn missing_assignment_is_reported_before_missing_course() {
        let app = TestApp::spawn().await;
        let (_, token) = app.create_instructor("instructor1").await;

        let res = app
            .patch_empty_with_token(&routes::assign_course(9999, 9999), &token)
            .await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["message"], "Assignment not found");
    }
}

mod assignment_copy {
    use super::*;

    #[tokio::test]
    async fn copies_settings_and_course_but_not_roster() {
        let app = TestApp::spawn().await;
        let (_, token, id) = setup_assignment(
            &app,
            json!({"title": "Program 1", "has_badge": true, "max_team_size": 4}),
        )
        .await;
        let course_id = app.insert_course("CSC 517").await;
        let attach = app
            .patch_empty_with_token(&routes::assign_course(id, course_id), &token)
            .await;
        assert_eq!(attach.status, 200);
        let student_id = app.insert_user("student1").await;
        let add = app
            .post_empty_with_token(&routes::add_participant(id, student_id), &token)
            .await;
        assert_eq!(add.status, 200);

        let res = app
            .post_empty_with_token(&routes::assignment_action(id, "copy_assignment"), &token)
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["title"], "Copy of Program 1");
        assert_eq!(res.body["has_badge"], true);
        assert_eq!(res.body["max_team_size"], 4);
        assert_eq!(res.body["course_id"], course_id);
        let copy_id = res.id();
        assert_ne!(copy_id, id);

        let copied_participants = participant::Entity::find()
            .filter(participant::Column::AssignmentId.eq(copy_id))
            .count(&app.db)
            .await
            .unwrap();
        assert_eq!(copied_participants, 0);
    }

    #[tokio::test]
    async fn copy_that_would_exceed_the_title_limit_is_rejected() {
        let app = TestApp::spawn().await;
        let (_, token, id) = setup_assignment(&app, json!({"title": "x".repeat(256)})).await;

        let res = app
            .post_empty_with_token(&routes::assignment_action(id, "copy_assignment"), &token)
            .await;

        assert_eq!(res.status, 422);
        assert!(res.body["errors"]["title"].is_array());
        let listed = app.get_with_token(routes::ASSIGNMENTS, &token).await;
        assert_eq!(listed.body.as_array().map(Vec::len), Some(1));
    }

    #[tokio::test]
    async fn copy_title_may_reach_the_limit_exactly() {
        let app = TestApp::spawn().await;
        let (_, token, id) = setup_assignment(&app, json!({"title": "x".repeat(248)})).await;

        let res = app
            .post_empty_with_token(&routes::assignment_action(id, "copy_assignment"), &token)
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["title"].as_str().map(|t| t.chars().count()), Some(256));
    }

    #[tokio::test]
    async fn copying_nonexistent_assignment_is_not_found() {
        let app = TestApp::spawn().await;
        let (_, token) = app.create_instructor("instructor1").await;

        let res = app
            .post_empty_with_token(&routes::assignment_action(9999, "copy_assignment"), &token)
            .await;

        assert_eq!(res.status, 404);
    }
}

mod assignment_predicates {
    use super::*;

    #[tokio::test]
    async fn flag_predicates_reflect_stored_values() {
        let app = TestApp::spawn().await;
        let (_, token, id) = setup_assignment(
            &app,
            json!({
                "title": "Program 1",
                "has_badge": true,
                "enable_pair_programming": false,
                "is_calibrated": true,
            }),
        )
        .await;

        for (action, expected) in [
            ("has_badge", true),
            ("pair_programming_enabled", false),
            ("is_calibrated", true),
        ] {
            let res = app
                .get_with_token(&routes::assignment_action(id, action), &token)
                .await;
            assert_eq!(res.status, 200, "{action}: {}", res.text);
            assert_eq!(res.body, json!(expected), "{action}");
        }
    }

    #[tokio::test]
    async fn predicates_also_accept_post() {
        let app = TestApp::spawn().await;
        let (_, token, id) =
            setup_assignment(&app, json!({"title": "Program 1", "has_badge": true})).await;

        let res = app
            .post_empty_with_token(&routes::assignment_action(id, "has_badge"), &token)
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body, json!(true));
    }

    #[tokio::test]
    async fn team_assignment_depends_on_max_team_size() {
        let app = TestApp::spawn().await;
        let (_, token) = app.create_instructor("instructor1").await;
        let solo = app
            .create_assignment(&token, json!({"title": "Solo", "max_team_size": 1}))
            .await;
        let teams = app
            .create_assignment(&token, json!({"title": "Teams", "max_team_size": 5}))
            .await;

        let res = app
            .get_with_token(&routes::assignment_action(solo, "team_assignment"), &token)
            .await;
        assert_eq!(res.body, json!(false));

        let res = app
            .get_with_token(&routes::assignment_action(teams, "team_assignment"), &token)
            .await;
        assert_eq!(res.body, json!(true));
    }

    #[tokio::test]
    async fn has_topics_and_has_teams_check_existence() {
        let app = TestApp::spawn().await;
        let (_, token, id) = setup_assignment(&app, json!({"title": "Program 1"})).await;

        for action in ["has_topics", "has_teams"] {
            let res = app
                .get_with_token(&routes::assignment_action(id, action), &token)
                .await;
            assert_eq!(res.body, json!(false), "{action} before insert");
        }

        app.insert_topic(id, "Parsers").await;
        app.insert_team(id, "Team 1").await;

        for action in ["has_topics", "has_teams"] {
            let res = app
                .get_with_token(&routes::assignment_action(id, action), &token)
                .await;
            assert_eq!(res.body, json!(true), "{action} after insert");
        }
    }

    #[tokio::test]
    async fn every_predicate_is_not_found_for_missing_assignment() {
        let app = TestApp::spawn().await;
        let (_, token) = app.create_instructor("instructor1").await;

        for action in [
            "has_badge",
            "pair_programming_enabled",
            "has_topics",
            "team_assignment",
            "is_calibrated",
            "has_teams",
            "staggered_and_no_topic",
            "varying_rubrics_by_round",
        ] {
            let res = app
                .get_with_token(&routes::assignment_action(9999, action), &token)
                .await;
            assert_eq!(res.status, 404, "{action}");
        }
        let res = app
            .get_with_token(&routes::valid_num_review(9999, "review"), &token)
            .await;
        assert_eq!(res.status, 404);
    }

    #[tokio::test]
    async fn course_and_node_mutations_are_not_found_for_missing_assignment() {
        let app = TestApp::spawn().await;
        let (_, token) = app.create_instructor("instructor1").await;
        let course_id = app.insert_course("CSC 517").await;

        let res = app
            .patch_empty_with_token(
                &routes::assignment_action(9999, "remove_assignment_from_course"),
                &token,
            )
            .await;
        assert_eq!(res.status, 404);
        assert_eq!(res.body["message"], "Assignment not found");

        let res = app
            .post_empty_with_token(&routes::assignment_action(9999, "create_node"), &token)
            .await;
        assert_eq!(res.status, 404);
        assert_eq!(res.body["message"], "Assignment not found");

        let res = app
            .patch_empty_with_token(&routes::assign_course(9999, course_id), &token)
            .await;
        assert_eq!(res.status, 404);
        assert_eq!(res.body["message"], "Assignment not found");
    }

    #[tokio::test]
    async fn valid_num_review_compares_allowed_with_required() {
        let app = TestApp::spawn().await;
        let (_, token, id) = setup_assignment(
            &app,
            json!({
                "title": "Program 1",
                "num_reviews_required": 3,
                "num_reviews_allowed": 2,
                "num_metareviews_required": 1,
                "num_metareviews_allowed": 1,
            }),
        )
        .await;

        let res = app
            .get_with_token(&routes::valid_num_review(id, "review"), &token)
            .await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body["success"], false);
        assert!(res.body["message"].is_string());

        let res = app
            .get_with_token(&routes::valid_num_review(id, "metareview"), &token)
            .await;
        assert_eq!(res.body["success"], true);
        assert_eq!(res.body["message"], serde_json::Value::Null);
    }

    #[tokio::test]
    async fn valid_num_review_rejects_unknown_type() {
        let app = TestApp::spawn().await;
        let (_, token, id) = setup_assignment(&app, json!({"title": "Program 1"})).await;

        let res = app
            .get_with_token(&routes::valid_num_review(id, "selfreview"), &token)
            .await;

        assert_eq!(res.status, 422);
    }
}

mod staggered_and_no_topic {
    use super::*;

    #[tokio::test]
    async fn true_when_staggered_and_caller_has_no_topic() {
        let app = TestApp::spawn().await;
        let (_, token, id) =
            setup_assignment(&app, json!({"title": "Program 1", "staggered_deadline": true})).await;

        let res = app
            .get_with_token(&routes::assignment_action(id, "staggered_and_no_topic"), &token)
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body, json!(true));
    }

    #[tokio::test]
    async fn false_when_deadlines_are_not_staggered() {
        let app = TestApp::spawn().await;
        let (_, token, id) = setup_assignment(&app, json!({"title": "Program 1"})).await;

        let res = app
            .get_with_token(&routes::assignment_action(id, "staggered_and_no_topic"), &token)
            .await;

        assert_eq!(res.body, json!(false));
    }

    #[tokio::test]
    async fn answers_for_the_calling_user() {
        let app = TestApp::spawn().await;
        let (_, token, id) =
            setup_assignment(&app, json!({"title": "Program 1", "staggered_deadline": true})).await;
        let (signed_up_id, signed_up_token) = app.create_student("student1").await;
        let (_, other_token) = app.create_student("student2").await;

        let team_id = app.insert_team(id, "Team 1").await;
        app.add_team_member(team_id, signed_up_id).await;
        let topic_id = app.insert_topic(id, "Parsers").await;
        app.sign_up_team(team_id, topic_id).await;

        let path = routes::assignment_action(id, "staggered_and_no_topic");
        let res = app.get_with_token(&path, &signed_up_token).await;
        assert_eq!(res.body, json!(false));

        let res = app.get_with_token(&path, &other_token).await;
        assert_eq!(res.body, json!(true));

        let res = app.get_with_token(&path, &token).await;
        assert_eq!(res.body, json!(true));
    }
}

mod tree_nodes {
    use super::*;

    #[tokio::test]
    async fn node_is_parented_under_the_course_node() {
        let app = TestApp::spawn().await;
        let (_, token, id) = setup_assignment(&app, json!({"title": "Program 1"})).await;
        let course_id = app.insert_course("CSC 517").await;
        let course_node_id = app.insert_course_node(course_id).await;
        let attach = app
            .patch_empty_with_token(&routes::assign_course(id, course_id), &token)
            .await;
        assert_eq!(attach.status, 200);

        let res = app
            .post_empty_with_token(&routes::assignment_action(id, "create_node"), &token)
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["node_type"], "AssignmentNode");
        assert_eq!(res.body["node_object_id"], id);
        assert_eq!(res.body["parent_id"], course_node_id);
    }

    #[tokio::test]
    async fn node_without_course_has_no_parent() {
        let app = TestApp::spawn().await;
        let (_, token, id) = setup_assignment(&app, json!({"title": "Program 1"})).await;

        let res = app
            .post_empty_with_token(&routes::assignment_action(id, "create_node"), &token)
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["parent_id"], serde_json::Value::Null);
    }
}

mod varying_rubrics {
    use super::*;

    #[tokio::test]
    async fn not_found_without_any_rubric() {
        let app = TestApp::spawn().await;
        let (_, token, id) = setup_assignment(&app, json!({"title": "Program 1"})).await;

        let res = app
            .get_with_token(
                &routes::assignment_action(id, "varying_rubrics_by_round"),
                &token,
            )
            .await;

        assert_eq!(res.status, 404);
        assert_eq!(
            res.body["message"],
            "No questionnaire/rubric exists for this assignment."
        );
    }

    #[tokio::test]
    async fn identical_rubrics_in_each_round_do_not_vary() {
        let app = TestApp::spawn().await;
        let (instructor_id, token, id) =
            setup_assignment(&app, json!({"title": "Program 1"})).await;
        let round1 = app.insert_questionnaire("Round 1", instructor_id).await;
        let round2 = app.insert_questionnaire("Round 2", instructor_id).await;
        for questionnaire_id in [round1, round2] {
            add_question(&app, &token, questionnaire_id, "Is it tested?", 1).await;
            add_question(&app, &token, questionnaire_id, "Is it documented?", 2).await;
        }
        app.link_questionnaire(id, round1, Some(1)).await;
        app.link_questionnaire(id, round2, Some(2)).await;

        let res = app
            .get_with_token(
                &routes::assignment_action(id, "varying_rubrics_by_round"),
                &token,
            )
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body, json!(false));
    }

    #[tokio::test]
    async fn differing_question_weight_varies() {
        let app = TestApp::spawn().await;
        let (instructor_id, token, id) =
            setup_assignment(&app, json!({"title": "Program 1"})).await;
        let round1 = app.insert_questionnaire("Round 1", instructor_id).await;
        let round2 = app.insert_questionnaire("Round 2", instructor_id).await;
        add_question(&app, &token, round1, "Is it tested?", 1).await;
        add_question(&app, &token, round2, "Is it tested?", 3).await;
        app.link_questionnaire(id, round1, Some(1)).await;
        app.link_questionnaire(id, round2, Some(2)).await;

        let res = app
            .get_with_token(
                &routes::assignment_action(id, "varying_rubrics_by_round"),
                &token,
            )
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body, json!(true));
    }

    #[tokio::test]
    async fn single_round_never_varies() {
        let app = TestApp::spawn().await;
        let (instructor_id, token, id) =
            setup_assignment(&app, json!({"title": "Program 1"})).await;
        let rubric = app.insert_questionnaire("Rubric", instructor_id).await;
        add_question(&app, &token, rubric, "Is it tested?", 1).await;
        app.link_questionnaire(id, rubric, None).await;

        let res = app
            .get_with_token(
                &routes::assignment_action(id, "varying_rubrics_by_round"),
                &token,
            )
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body, json!(false));
    }

    #[tokio::test]
    async fn roundless_rubric_counts_toward_every_round() {
        let app = TestApp::spawn().await;
        let (instructor_id, token, id) =
            setup_assignment(&app, json!({"title": "Program 1"})).await;
        let round1 = app.insert_questionnaire("Round 1", instructor_id).await;
        let round2 = app.insert_questionnaire("Round 2", instructor_id).await;
        let shared = app.insert_questionnaire("Shared", instructor_id).await;
        add_question(&app, &token, round1, "Is it tested?", 1).await;
        add_question(&app, &token, round2, "Is it tested?", 1).await;
        add_question(&app, &token, shared, "Any other feedback?", 1).await;
        app.link_questionnaire(id, round1, Some(1)).await;
        app.link_questionnaire(id, round2, Some(2)).await;
        app.link_questionnaire(id, shared, None).await;

        let path = routes::assignment_action(id, "varying_rubrics_by_round");
        let res = app.get_with_token(&path, &token).await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body, json!(false));

        // An extra rubric on round 2 alone makes the rounds differ.
        let extra = app.insert_questionnaire("Round 2 extra", instructor_id).await;
        add_question(&app, &token, extra, "Is it documented?", 1).await;
        app.link_questionnaire(id, extra, Some(2)).await;

        let res = app.get_with_token(&path, &token).await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body, json!(true));
    }
}
