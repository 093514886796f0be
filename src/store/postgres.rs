// src/store/postgres.rs

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::{
    error::AppResult,
    models::{
        community::{Community, CommunityProfile},
        post::Post,
        user::{User, UserProfile},
    },
    store::{EntityStore, SortOrder, SubtreeRemoval, UserQuery},
};

const POST_COLUMNS: &str = "id, text, author_id, community_id, parent_id, children, created_at";
const USER_COLUMNS: &str = "id, username, name, bio, image, onboarded, posts, created_at";
const COMMUNITY_COLUMNS: &str = "id, username, name, bio, image, created_by, posts, created_at";

/// `EntityStore` over Postgres. Reference lists live in `TEXT[]` columns.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Escapes LIKE wildcards so a search term matches literally.
fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

/// Appends the WHERE clause shared by user search and count.
fn push_user_filter(builder: &mut QueryBuilder<'_, Postgres>, query: &UserQuery) {
    builder.push(" WHERE id <> ");
    builder.push_bind(query.exclude_id.clone());

    if let Some(term) = query.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        let pattern = like_pattern(term);
        builder.push(" AND (username ILIKE ");
        builder.push_bind(pattern.clone());
        builder.push(" OR name ILIKE ");
        builder.push_bind(pattern);
        builder.push(")");
    }
}

#[async_trait]
impl EntityStore for PgStore {
    async fn find_post(&self, id: &str) -> AppResult<Option<Post>> {
        let sql = format!("SELECT {} FROM posts WHERE id = $1", POST_COLUMNS);
        let post = sqlx::query_as::<_, Post>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(post)
    }

    async fn find_posts(&self, ids: &[String]) -> AppResult<Vec<Post>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!("SELECT {} FROM posts WHERE id = ANY($1)", POST_COLUMNS);
        let posts = sqlx::query_as::<_, Post>(&sql)
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(posts)
    }

    async fn find_replies(&self, parent_ids: &[String]) -> AppResult<Vec<Post>> {
        if parent_ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!("SELECT {} FROM posts WHERE parent_id = ANY($1)", POST_COLUMNS);
        let posts = sqlx::query_as::<_, Post>(&sql)
            .bind(parent_ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(posts)
    }

    async fn insert_post(&self, post: &Post) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO posts (id, text, author_id, community_id, parent_id, children, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(&post.id)
        .bind(&post.text)
        .bind(&post.author_id)
        .bind(&post.community_id)
        .bind(&post.parent_id)
        .bind(&post.children)
        .bind(post.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn push_child(&self, parent_id: &str, child_id: &str) -> AppResult<bool> {
        let result =
            sqlx::query("UPDATE posts SET children = array_append(children, $2) WHERE id = $1")
                .bind(parent_id)
                .bind(child_id)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_top_level(&self, offset: i64, limit: i64) -> AppResult<Vec<Post>> {
        let sql = format!(
            r#"
            SELECT {}
            FROM posts
            WHERE parent_id IS NULL
            ORDER BY created_at DESC, id
            LIMIT $1 OFFSET $2
            "#,
            POST_COLUMNS
        );
        let posts = sqlx::query_as::<_, Post>(&sql)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;
        Ok(posts)
    }

    async fn count_top_level(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts WHERE parent_id IS NULL")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn delete_posts(&self, ids: &[String]) -> AppResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }
        let result = sqlx::query("DELETE FROM posts WHERE id = ANY($1)")
            .bind(ids)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn find_user(&self, id: &str) -> AppResult<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_users(&self, ids: &[String]) -> AppResult<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!("SELECT {} FROM users WHERE id = ANY($1)", USER_COLUMNS);
        let users = sqlx::query_as::<_, User>(&sql)
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    async fn upsert_user(&self, profile: &UserProfile) -> AppResult<User> {
        let sql = format!(
            r#"
            INSERT INTO users (id, username, name, bio, image, onboarded)
            VALUES ($1, $2, $3, $4, $5, TRUE)
            ON CONFLICT (id) DO UPDATE SET
                username = EXCLUDED.username,
                name = EXCLUDED.name,
                bio = EXCLUDED.bio,
                image = EXCLUDED.image,
                onboarded = TRUE
            RETURNING {}
            "#,
            USER_COLUMNS
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(&profile.id)
            .bind(&profile.username)
            .bind(&profile.name)
            .bind(&profile.bio)
            .bind(&profile.image)
            .fetch_one(&self.pool)
            .await?;
        Ok(user)
    }

    async fn push_user_post(&self, user_id: &str, post_id: &str) -> AppResult<bool> {
        let result = sqlx::query("UPDATE users SET posts = array_append(posts, $2) WHERE id = $1")
            .bind(user_id)
            .bind(post_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn search_users(
        &self,
        query: &UserQuery,
        offset: i64,
        limit: i64,
    ) -> AppResult<Vec<User>> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {} FROM users", USER_COLUMNS));
        push_user_filter(&mut builder, query);
        builder.push(match query.sort {
            SortOrder::Asc => " ORDER BY created_at ASC, id",
            SortOrder::Desc => " ORDER BY created_at DESC, id",
        });
        builder.push(" LIMIT ");
        builder.push_bind(limit);
        builder.push(" OFFSET ");
        builder.push_bind(offset);

        let users = builder
            .build_query_as::<User>()
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    async fn count_users(&self, query: &UserQuery) -> AppResult<i64> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("SELECT COUNT(*) FROM users");
        push_user_filter(&mut builder, query);

        let count = builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn find_community(&self, id: &str) -> AppResult<Option<Community>> {
        let sql = format!("SELECT {} FROM communities WHERE id = $1", COMMUNITY_COLUMNS);
        let community = sqlx::query_as::<_, Community>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(community)
    }

    async fn find_communities(&self, ids: &[String]) -> AppResult<Vec<Community>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!("SELECT {} FROM communities WHERE id = ANY($1)", COMMUNITY_COLUMNS);
        let communities = sqlx::query_as::<_, Community>(&sql)
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(communities)
    }

    async fn upsert_community(&self, profile: &CommunityProfile) -> AppResult<Community> {
        let sql = format!(
            r#"
            INSERT INTO communities (id, username, name, bio, image, created_by)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (id) DO UPDATE SET
                username = EXCLUDED.username,
                name = EXCLUDED.name,
                bio = EXCLUDED.bio,
                image = EXCLUDED.image
            RETURNING {}
            "#,
            COMMUNITY_COLUMNS
        );
        let community = sqlx::query_as::<_, Community>(&sql)
            .bind(&profile.id)
            .bind(&profile.username)
            .bind(&profile.name)
            .bind(&profile.bio)
            .bind(&profile.image)
            .bind(&profile.created_by)
            .fetch_one(&self.pool)
            .await?;
        Ok(community)
    }

    async fn push_community_post(&self, community_id: &str, post_id: &str) -> AppResult<bool> {
        let result =
            sqlx::query("UPDATE communities SET posts = array_append(posts, $2) WHERE id = $1")
                .bind(community_id)
                .bind(post_id)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn remove_subtree(&self, removal: &SubtreeRemoval) -> AppResult<()> {
        if removal.post_ids.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM posts WHERE id = ANY($1)")
            .bind(&removal.post_ids)
            .execute(&mut *tx)
            .await?;

        // Order-preserving set difference on each reference array.
        sqlx::query(
            r#"
            UPDATE posts
            SET children = ARRAY(
                SELECT c FROM unnest(children) WITH ORDINALITY AS t(c, ord)
                WHERE c <> ALL($1) ORDER BY ord
            )
            WHERE children && $1
            "#,
        )
        .bind(&removal.post_ids)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            UPDATE users
            SET posts = ARRAY(
                SELECT p FROM unnest(posts) WITH ORDINALITY AS t(p, ord)
                WHERE p <> ALL($1) ORDER BY ord
            )
            WHERE id = ANY($2) AND posts && $1
            "#,
        )
        .bind(&removal.post_ids)
        .bind(&removal.author_ids)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            UPDATE communities
            SET posts = ARRAY(
                SELECT p FROM unnest(posts) WITH ORDINALITY AS t(p, ord)
                WHERE p <> ALL($1) ORDER BY ord
            )
            WHERE id = ANY($2) AND posts && $1
            "#,
        )
        .bind(&removal.post_ids)
        .bind(&removal.community_ids)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }
}
