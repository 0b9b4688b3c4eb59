use chrono::Utc;
use std::cmp::Ordering;
use std::sync::{Mutex, MutexGuard};

use super::seed::SeedData;
use super::Store;
use crate::article::{Article, ArticleSummary};
use crate::comment::{Comment, NewComment};
use crate::topic::Topic;
use crate::types::{ApiError, ARTICLE_MISSING, COMMENT_MISSING, TOPIC_MISSING, USER_MISSING};
use crate::user::User;
use crate::validate::{ArticleQuery, Order, SortBy, VOTES_OUT_OF_RANGE};

#[derive(Debug, Default)]
struct Tables {
    topics: Vec<Topic>,
    users: Vec<User>,
    articles: Vec<Article>,
    comments: Vec<Comment>,
    next_comment_id: i32,
}

impl Tables {
    fn article_exists(&self, article_id: i32) -> bool {
        self.articles.iter().any(|a| a.article_id == article_id)
    }

    fn comment_count(&self, article_id: i32) -> i64 {
        self.comments
            .iter()
            .filter(|c| c.article_id == article_id)
            .count() as i64
    }
}

/// A process-local store holding one seeded data set. Mirrors the Postgres
/// store's behavior, including id assignment and error messages.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn seeded(data: &SeedData) -> Self {
        let articles = data
            .articles
            .iter()
            .zip(1..)
            .map(|(new, article_id)| Article {
                article_id,
                title: new.title.clone(),
                topic: new.topic.clone(),
                author: new.author.clone(),
                body: new.body.clone(),
                created_at: new.created_at,
                votes: new.votes,
                article_img_url: new.article_img_url.clone(),
            })
            .collect();
        let comments: Vec<Comment> = data
            .comments
            .iter()
            .zip(1..)
            .map(|(new, comment_id)| Comment {
                comment_id,
                body: new.body.clone(),
                article_id: new.article_id,
                author: new.author.clone(),
                votes: new.votes,
                created_at: new.created_at,
            })
            .collect();
        let next_comment_id = comments.len() as i32 + 1;

        MemoryStore {
            tables: Mutex::new(Tables {
                topics: data.topics.clone(),
                users: data.users.clone(),
                articles,
                comments,
                next_comment_id,
            }),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>, ApiError> {
        self.tables.lock().map_err(|_| ApiError::Internal)
    }
}

fn compare(a: &ArticleSummary, b: &ArticleSummary, sort_by: SortBy) -> Ordering {
    let primary = match sort_by {
        SortBy::ArticleId => Ordering::Equal,
        SortBy::Title => a.title.cmp(&b.title),
        SortBy::Topic => a.topic.cmp(&b.topic),
        SortBy::Author => a.author.cmp(&b.author),
        SortBy::CreatedAt => a.created_at.cmp(&b.created_at),
        SortBy::Votes => a.votes.cmp(&b.votes),
        SortBy::CommentCount => a.comment_count.cmp(&b.comment_count),
        SortBy::ArticleImgUrl => a.article_img_url.cmp(&b.article_img_url),
    };
    primary.then(a.article_id.cmp(&b.article_id))
}

impl Store for MemoryStore {
    fn topics(&self) -> Result<Vec<Topic>, ApiError> {
        Ok(self.lock()?.topics.clone())
    }

    fn users(&self) -> Result<Vec<User>, ApiError> {
        Ok(self.lock()?.users.clone())
    }

    fn articles(&self, query: &ArticleQuery) -> Result<Vec<ArticleSummary>, ApiError> {
        let tables = self.lock()?;
        if let Some(topic) = query.topic.as_deref() {
            if !tables.topics.iter().any(|t| t.slug == topic) {
                return Err(ApiError::NotFound(TOPIC_MISSING));
            }
        }

        let mut summaries: Vec<ArticleSummary> = tables
            .articles
            .iter()
            .filter(|a| query.topic.as_deref().map_or(true, |topic| a.topic == topic))
            .map(|a| ArticleSummary::with_count(a, tables.comment_count(a.article_id)))
            .collect();
        summaries.sort_by(|a, b| {
            let ordering = compare(a, b, query.sort_by);
            match query.order {
                Order::Asc => ordering,
                Order::Desc => ordering.reverse(),
            }
        });
        Ok(summaries)
    }

    fn article(&self, article_id: i32) -> Result<Article, ApiError> {
        self.lock()?
            .articles
            .iter()
            .find(|a| a.article_id == article_id)
            .cloned()
            .ok_or(ApiError::NotFound(ARTICLE_MISSING))
    }

    fn adjust_votes(&self, article_id: i32, inc_votes: i32) -> Result<Article, ApiError> {
        let mut tables = self.lock()?;
        let article = tables
            .articles
            .iter_mut()
            .find(|a| a.article_id == article_id)
            .ok_or(ApiError::NotFound(ARTICLE_MISSING))?;
        article.votes = article
            .votes
            .checked_add(inc_votes)
            .ok_or(ApiError::BadRequest(VOTES_OUT_OF_RANGE))?;
        Ok(article.clone())
    }

    fn comments_for(&self, article_id: i32) -> Result<Vec<Comment>, ApiError> {
        let tables = self.lock()?;
        if !tables.article_exists(article_id) {
            return Err(ApiError::NotFound(ARTICLE_MISSING));
        }
        let mut comments: Vec<Comment> = tables
            .comments
            .iter()
            .filter(|c| c.article_id == article_id)
            .cloned()
            .collect();
        comments.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then(b.comment_id.cmp(&a.comment_id))
        });
        Ok(comments)
    }

    fn add_comment(&self, comment: NewComment) -> Result<Comment, ApiError> {
        let mut tables = self.lock()?;
        if !tables.article_exists(comment.article_id) {
            return Err(ApiError::NotFound(ARTICLE_MISSING));
        }
        if !tables.users.iter().any(|u| u.username == comment.author) {
            return Err(ApiError::NotFound(USER_MISSING));
        }

        let created = Comment {
            comment_id: tables.next_comment_id,
            body: comment.body,
            article_id: comment.article_id,
            author: comment.author,
            votes: 0,
            created_at: Utc::now(),
        };
        tables.next_comment_id += 1;
        tables.comments.push(created.clone());
        Ok(created)
    }

    fn delete_comment(&self, comment_id: i32) -> Result<(), ApiError> {
        let mut tables = self.lock()?;
        let before = tables.comments.len();
        tables.comments.retain(|c| c.comment_id != comment_id);
        if tables.comments.len() == before {
            return Err(ApiError::NotFound(COMMENT_MISSING));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> MemoryStore {
        MemoryStore::seeded(&SeedData::test().unwrap())
    }

    #[test]
    fn listing_counts_comments_per_article() {
        let summaries = store().articles(&ArticleQuery::default()).unwrap();
        assert_eq!(summaries.len(), 13);

        let first = summaries.iter().find(|a| a.article_id == 1).unwrap();
        assert_eq!(first.comment_count, 11);
        let lonely = summaries.iter().find(|a| a.article_id == 2).unwrap();
        assert_eq!(lonely.comment_count, 0);
    }

    #[test]
    fn listing_breaks_ties_on_article_id() {
        let summaries = store().articles(&ArticleQuery::default()).unwrap();
        let twelve = summaries.iter().position(|a| a.article_id == 12).unwrap();
        let thirteen = summaries.iter().position(|a| a.article_id == 13).unwrap();
        assert_eq!(thirteen + 1, twelve);
    }

    #[test]
    fn listing_filters_and_sorts() {
        let query = ArticleQuery::parse(Some("mitch"), Some("votes"), Some("asc")).unwrap();
        let summaries = store().articles(&query).unwrap();
        assert_eq!(summaries.len(), 12);
        assert!(summaries.iter().all(|a| a.topic == "mitch"));
        assert_eq!(summaries.last().unwrap().votes, 100);

        let query = ArticleQuery::parse(Some("paper"), None, None).unwrap();
        assert!(store().articles(&query).unwrap().is_empty());

        let query = ArticleQuery::parse(Some("dogs"), None, None).unwrap();
        assert!(matches!(
            store().articles(&query),
            Err(ApiError::NotFound(TOPIC_MISSING))
        ));
    }

    #[test]
    fn new_comments_take_the_next_id() {
        let store = store();
        let comment = store
            .add_comment(NewComment {
                article_id: 2,
                author: "lurker".into(),
                body: "first!".into(),
            })
            .unwrap();
        assert_eq!(comment.comment_id, 19);
        assert_eq!(comment.votes, 0);
        assert_eq!(store.comments_for(2).unwrap(), vec![comment]);
    }

    #[test]
    fn add_comment_reports_the_missing_reference() {
        let store = store();
        let missing_user = store.add_comment(NewComment {
            article_id: 1,
            author: "notUser".into(),
            body: "hello".into(),
        });
        assert!(matches!(missing_user, Err(ApiError::NotFound(USER_MISSING))));

        let missing_article = store.add_comment(NewComment {
            article_id: 999,
            author: "lurker".into(),
            body: "hello".into(),
        });
        assert!(matches!(missing_article, Err(ApiError::NotFound(ARTICLE_MISSING))));
    }

    #[test]
    fn votes_may_go_negative() {
        let store = store();
        let article = store.adjust_votes(2, -5).unwrap();
        assert_eq!(article.votes, -5);
        assert_eq!(store.article(2).unwrap().votes, -5);
    }

    #[test]
    fn overflowing_votes_leave_the_article_alone() {
        let store = store();
        assert!(matches!(
            store.adjust_votes(1, i32::MAX),
            Err(ApiError::BadRequest(VOTES_OUT_OF_RANGE))
        ));
        assert_eq!(store.article(1).unwrap().votes, 100);
    }

    #[test]
    fn deleting_twice_is_a_not_found() {
        let store = store();
        store.delete_comment(1).unwrap();
        assert!(matches!(
            store.delete_comment(1),
            Err(ApiError::NotFound(COMMENT_MISSING))
        ));
    }
}
