//! Category navigation tree
//!
//! Assembles the full category → subcategory → sub-subcategory tree
//! with products attached at the deepest level they name. Cached
//! under a single fixed key so one expensive assembly serves every
//! visitor until a catalog mutation invalidates it.
use crate::db::category_repo::CategoryRepository;
use crate::error::Result;
use crate::models::{
    Category, CategoryNode, ProductSummary, SubSubcategory, SubSubcategoryNode, Subcategory,
    SubcategoryNode,
};
use crate::services::read_through::{read_through, CachedPayload};
use shop_cache::keys::{ttl, CATEGORY_TREE_KEY};
use shop_cache::{CacheOperations, ShopCache};
use std::time::Duration;
use tracing::warn;

#[derive(Clone)]
pub struct CategoryTreeService {
    categories: CategoryRepository,
    cache: ShopCache,
    read_timeout: Duration,
}

impl CategoryTreeService {
    pub fn new(categories: CategoryRepository, cache: ShopCache, read_timeout: Duration) -> Self {
        Self {
            categories,
            cache,
            read_timeout,
        }
    }

    pub async fn tree(&self) -> Result<CachedPayload<Vec<CategoryNode>>> {
        let categories = self.categories.clone();

        read_through(
            &self.cache,
            CATEGORY_TREE_KEY,
            ttl::ENTITY,
            self.read_timeout,
            |tree: &Vec<CategoryNode>| !tree.is_empty(),
            || async move {
                let cats = categories.all_categories().await?;
                let subs = categories.all_subcategories().await?;
                let subsubs = categories.all_subsubcategories().await?;
                let products = categories.all_categorized_products().await?;
                Ok(build_tree(cats, subs, subsubs, products))
            },
        )
        .await
    }

    /// Drop the cached tree after a stock-changing mutation. Failures
    /// only mean the tree stays slightly stale until its TTL runs out.
    pub async fn invalidate(&self) {
        if let Err(e) = self.cache.del(CATEGORY_TREE_KEY).await {
            warn!(error = %e, "failed to invalidate category tree");
        }
    }
}

/// Assemble the tree in memory from four flat result sets. A product
/// attaches to its sub-subcategory when it names one, otherwise to
/// its subcategory, otherwise directly to the category.
pub fn build_tree(
    categories: Vec<Category>,
    subcategories: Vec<Subcategory>,
    subsubcategories: Vec<SubSubcategory>,
    products: Vec<ProductSummary>,
) -> Vec<CategoryNode> {
    categories
        .into_iter()
        .map(|cat| {
            let subs: Vec<SubcategoryNode> = subcategories
                .iter()
                .filter(|s| s.category_id == cat.id)
                .map(|sub| {
                    let subsubs: Vec<SubSubcategoryNode> = subsubcategories
                        .iter()
                        .filter(|ss| ss.sub_category_id == sub.id)
                        .map(|ss| SubSubcategoryNode {
                            id: ss.id,
                            name: ss.name.clone(),
                            image: ss.image.clone(),
                            products: products
                                .iter()
                                .filter(|p| p.sub_sub_category_id == Some(ss.id))
                                .cloned()
                                .collect(),
                        })
                        .collect();

                    SubcategoryNode {
                        id: sub.id,
                        name: sub.name.clone(),
                        image: sub.image.clone(),
                        products: products
                            .iter()
                            .filter(|p| {
                                p.sub_category_id == Some(sub.id)
                                    && p.sub_sub_category_id.is_none()
                            })
                            .cloned()
                            .collect(),
                        subsubcategories: subsubs,
                    }
                })
                .collect();

            CategoryNode {
                id: cat.id,
                name: cat.name.clone(),
                image: cat.image.clone(),
                products: products
                    .iter()
                    .filter(|p| {
                        p.category_id == Some(cat.id) && p.sub_category_id.is_none()
                    })
                    .cloned()
                    .collect(),
                subcategories: subs,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn summary(
        name: &str,
        category: Uuid,
        sub: Option<Uuid>,
        subsub: Option<Uuid>,
    ) -> ProductSummary {
        ProductSummary {
            id: Uuid::new_v4(),
            name: name.into(),
            image: None,
            price: 10.0,
            discount: 0.0,
            stock: 5,
            remark: None,
            category_id: Some(category),
            sub_category_id: sub,
            sub_sub_category_id: subsub,
        }
    }

    #[test]
    fn products_attach_at_their_deepest_level() {
        let cat = Uuid::new_v4();
        let sub = Uuid::new_v4();
        let subsub = Uuid::new_v4();

        let tree = build_tree(
            vec![Category {
                id: cat,
                name: "Men".into(),
                image: None,
            }],
            vec![Subcategory {
                id: sub,
                category_id: cat,
                name: "Shirts".into(),
                image: None,
            }],
            vec![SubSubcategory {
                id: subsub,
                sub_category_id: sub,
                name: "Formal".into(),
                image: None,
            }],
            vec![
                summary("direct", cat, None, None),
                summary("mid", cat, Some(sub), None),
                summary("deep", cat, Some(sub), Some(subsub)),
            ],
        );

        assert_eq!(tree.len(), 1);
        let cat_node = &tree[0];
        assert_eq!(cat_node.products.len(), 1);
        assert_eq!(cat_node.products[0].name, "direct");

        let sub_node = &cat_node.subcategories[0];
        assert_eq!(sub_node.products.len(), 1);
        assert_eq!(sub_node.products[0].name, "mid");

        let subsub_node = &sub_node.subsubcategories[0];
        assert_eq!(subsub_node.products.len(), 1);
        assert_eq!(subsub_node.products[0].name, "deep");
    }

    #[test]
    fn empty_catalog_yields_empty_tree() {
        let tree = build_tree(Vec::new(), Vec::new(), Vec::new(), Vec::new());
        assert!(tree.is_empty());
    }

    #[test]
    fn subcategories_group_under_their_parent() {
        let cat_a = Uuid::new_v4();
        let cat_b = Uuid::new_v4();
        let sub_a = Uuid::new_v4();

        let tree = build_tree(
            vec![
                Category {
                    id: cat_a,
                    name: "A".into(),
                    image: None,
                },
                Category {
                    id: cat_b,
                    name: "B".into(),
                    image: None,
                },
            ],
            vec![Subcategory {
                id: sub_a,
                category_id: cat_a,
                name: "A1".into(),
                image: None,
            }],
            Vec::new(),
            Vec::new(),
        );

        assert_eq!(tree[0].subcategories.len(), 1);
        assert!(tree[1].subcategories.is_empty());
    }
}
