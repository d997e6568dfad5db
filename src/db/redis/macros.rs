/// Cache-or-compute over the Redis cache.
///
/// Checks the cache for `$key`; on a hit the stored value is returned, on a
/// miss `$block` runs, its result is queued for a background cache write,
/// and the computed value is returned.
///
/// # Arguments
/// * `$cache`: a [`crate::db::Cache`] instance.
/// * `$key`: the [`crate::db::CacheKey`] to store under.
/// * `$ttl`: time-to-live for the cached value, in seconds.
/// * `$block`: async block producing the value on a cache miss.
///
/// # Example
/// ```ignore
/// let link = cached!(cache, key, LINK_CACHE_TTL, async move {
///     query_search_api().await
/// });
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        if let Some(cached) = $cache.get_from_cache(&$key).await? {
            Ok(cached)
        } else {
            let value = $block.await?;
            $cache.set_in_background(&$key, &value, $ttl);
            Ok(value)
        }
    }};
}
