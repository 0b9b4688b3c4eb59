use diesel::dsl::exists;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, PooledConnection};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::sql_types::{Nullable, Text};
use diesel::{delete, insert_into, select, sql_query, update};
use tracing::debug;

use super::{Pool, Store};
use crate::article::{Article, ArticleSummary};
use crate::comment::{Comment, NewComment};
use crate::topic::Topic;
use crate::types::{ApiError, ARTICLE_MISSING, COMMENT_MISSING, TOPIC_MISSING, USER_MISSING};
use crate::user::User;
use crate::validate::{ArticleQuery, VOTES_OUT_OF_RANGE};

const COMMENTS_ARTICLE_FK: &str = "comments_article_id_fkey";
const COMMENTS_AUTHOR_FK: &str = "comments_author_fkey";

/// `{order_by}` and `{order}` are filled from the whitelisted `SortBy` and
/// `Order` keywords; user input only ever arrives through `$1`.
static SELECT_ARTICLE_SUMMARIES: &str = "select articles.article_id,
       articles.title,
       articles.topic,
       articles.author,
       articles.created_at,
       articles.votes,
       articles.article_img_url,
       count(comments.comment_id) as comment_count
  from articles
  left join comments on comments.article_id = articles.article_id
 where ($1::text is null or articles.topic = $1)
 group by articles.article_id
 order by {order_by} {order}, articles.article_id {order};";

type DbConnection = PooledConnection<ConnectionManager<PgConnection>>;

pub struct PgStore {
    pool: Pool,
}

impl PgStore {
    pub fn new(pool: Pool) -> Self {
        PgStore { pool }
    }

    fn conn(&self) -> Result<DbConnection, ApiError> {
        Ok(self.pool.get()?)
    }
}

fn article_exists(conn: &mut PgConnection, id: i32) -> Result<bool, DieselError> {
    use super::schema::articles::dsl::*;
    select(exists(articles.filter(article_id.eq(id)))).get_result(conn)
}

impl Store for PgStore {
    fn topics(&self) -> Result<Vec<Topic>, ApiError> {
        use super::schema::topics::dsl::*;
        let mut conn = self.conn()?;
        Ok(topics.select(Topic::as_select()).load(&mut conn)?)
    }

    fn users(&self) -> Result<Vec<User>, ApiError> {
        use super::schema::users::dsl::*;
        let mut conn = self.conn()?;
        Ok(users.select(User::as_select()).load(&mut conn)?)
    }

    fn articles(&self, query: &ArticleQuery) -> Result<Vec<ArticleSummary>, ApiError> {
        use super::schema::topics::dsl::{slug, topics};
        let mut conn = self.conn()?;
        let statement = SELECT_ARTICLE_SUMMARIES
            .replace("{order_by}", query.sort_by.column())
            .replace("{order}", query.order.keyword());
        let summaries = sql_query(statement)
            .bind::<Nullable<Text>, _>(query.topic.clone())
            .load::<ArticleSummary>(&mut conn)?;

        if let (true, Some(wanted)) = (summaries.is_empty(), query.topic.as_deref()) {
            let known = select(exists(topics.filter(slug.eq(wanted)))).get_result::<bool>(&mut conn)?;
            if !known {
                return Err(ApiError::NotFound(TOPIC_MISSING));
            }
        }
        Ok(summaries)
    }

    fn article(&self, id: i32) -> Result<Article, ApiError> {
        use super::schema::articles::dsl::*;
        let mut conn = self.conn()?;
        articles
            .find(id)
            .select(Article::as_select())
            .first(&mut conn)
            .optional()?
            .ok_or(ApiError::NotFound(ARTICLE_MISSING))
    }

    fn adjust_votes(&self, id: i32, inc_votes: i32) -> Result<Article, ApiError> {
        use super::schema::articles::dsl::*;
        let mut conn = self.conn()?;
        debug!(article_id = id, inc_votes, "adjusting votes");
        conn.transaction::<_, ApiError, _>(|conn| {
            let current = articles
                .find(id)
                .select(votes)
                .for_update()
                .first::<i32>(conn)
                .optional()?
                .ok_or(ApiError::NotFound(ARTICLE_MISSING))?;
            let total = current
                .checked_add(inc_votes)
                .ok_or(ApiError::BadRequest(VOTES_OUT_OF_RANGE))?;
            Ok(update(articles.find(id))
                .set(votes.eq(total))
                .returning(Article::as_returning())
                .get_result(conn)?)
        })
    }

    fn comments_for(&self, id: i32) -> Result<Vec<Comment>, ApiError> {
        use super::schema::comments::dsl::*;
        let mut conn = self.conn()?;
        conn.build_transaction()
            .repeatable_read()
            .read_only()
            .run(|conn| {
                if !article_exists(conn, id)? {
                    return Err(ApiError::NotFound(ARTICLE_MISSING));
                }
                Ok(comments
                    .filter(article_id.eq(id))
                    .order((created_at.desc(), comment_id.desc()))
                    .select(Comment::as_select())
                    .load(conn)?)
            })
    }

    fn add_comment(&self, comment: NewComment) -> Result<Comment, ApiError> {
        use super::schema::comments::dsl::*;
        let mut conn = self.conn()?;
        let inserted = insert_into(comments)
            .values(&comment)
            .returning(Comment::as_returning())
            .get_result(&mut conn);
        match inserted {
            Ok(row) => Ok(row),
            Err(DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info)) => {
                let missing = match info.constraint_name() {
                    Some(COMMENTS_ARTICLE_FK) => Some(ARTICLE_MISSING),
                    Some(COMMENTS_AUTHOR_FK) => Some(USER_MISSING),
                    _ => None,
                };
                Err(match missing {
                    Some(message) => ApiError::NotFound(message),
                    None => DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info).into(),
                })
            }
            Err(err) => Err(err.into()),
        }
    }

    fn delete_comment(&self, id: i32) -> Result<(), ApiError> {
        use super::schema::comments::dsl::*;
        let mut conn = self.conn()?;
        let deleted = delete(comments.find(id)).execute(&mut conn)?;
        if deleted == 0 {
            return Err(ApiError::NotFound(COMMENT_MISSING));
        }
        Ok(())
    }
}
