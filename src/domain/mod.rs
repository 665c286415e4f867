pub mod comment;
pub mod page;
pub mod post;
pub mod subreddit;

pub use comment::{CommentNode, CommentRecord};
pub use page::{AggregatedPage, Page};
pub use post::Post;
pub use subreddit::SubredditInfo;
