#[cfg(test)]
mod tests {
    use crate::database::entity::{post, user};
    use crate::database::postgres_repo::{PostgresPostRepository, PostgresUserRepository};
    use kittygram_core::domain::{Post, User};
    use kittygram_core::error::RepoError;
    use kittygram_core::ports::{BaseRepository, PostRepository, UserRepository};
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn post_model(title: &str) -> post::Model {
        post::Model {
            id: uuid::Uuid::new_v4(),
            author_id: uuid::Uuid::new_v4(),
            title: title.to_owned(),
            description: "A cat".to_owned(),
            image: Some("posts/cat.jpg".to_owned()),
            created_at: chrono::Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_find_post_by_id() {
        let model = post_model("Schroedinger");
        let post_id = model.id;

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![model]])
            .into_connection();

        let repo = PostgresPostRepository::new(db);

        let result: Option<Post> = repo.find_by_id(post_id).await.unwrap();

        let post = result.unwrap();
        assert_eq!(post.title, "Schroedinger");
        assert_eq!(post.image.as_deref(), Some("posts/cat.jpg"));
        assert_eq!(post.id, post_id);
    }

    #[tokio::test]
    async fn test_find_all_maps_every_row() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![post_model("newer"), post_model("older")]])
            .into_connection();

        let repo = PostgresPostRepository::new(db);

        let posts = repo.find_all().await.unwrap();
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].title, "newer");
    }

    #[tokio::test]
    async fn test_find_user_by_username() {
        let model = user::Model {
            id: uuid::Uuid::new_v4(),
            username: "tester_1".to_owned(),
            email: "tester_1@example.com".to_owned(),
            password_hash: "argon2-hash".to_owned(),
            is_active: true,
            created_at: chrono::Utc::now().into(),
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![model]])
            .into_connection();

        let repo = PostgresUserRepository::new(db);

        let user: Option<User> = repo.find_by_username("tester_1").await.unwrap();
        assert_eq!(user.unwrap().username, "tester_1");
    }

    #[tokio::test]
    async fn test_delete_missing_post_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results(vec![MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();

        let repo = PostgresPostRepository::new(db);

        let err = BaseRepository::<Post, _>::delete(&repo, uuid::Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::NotFound));
    }
}
