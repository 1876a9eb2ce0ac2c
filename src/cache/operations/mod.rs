/// 缓存操作
mod page;

pub use page::RedisPathCache;
