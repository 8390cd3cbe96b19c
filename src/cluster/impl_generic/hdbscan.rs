//! Generic HDBSCAN clustering implementation.
//!
//! Steps: core distances → mutual reachability (on device) → Prim MST →
//! single-linkage hierarchy → condensed tree → stability → cluster extraction
//! (EOM/Leaf) → point labelling.

use crate::cluster::traits::hdbscan::{ClusterSelectionMethod, HdbscanOptions, HdbscanResult};
use crate::cluster::validation::{
    validate_cluster_dtype, validate_data_2d, validate_min_cluster_size, validate_min_samples,
};
use numr::dtype::DType;
use numr::error::Result;
use numr::ops::{
    CompareOps, ConditionalOps, DistanceOps, IndexingOps, ReduceOps, ScalarOps, ShapeOps,
    SortingOps, TensorOps, TypeConversionOps, UnaryOps, UtilityOps,
};
use numr::runtime::{Runtime, RuntimeClient};
use numr::tensor::Tensor;

/// Generic HDBSCAN clustering implementation.
pub fn hdbscan_impl<R, C>(
    client: &C,
    data: &Tensor<R>,
    options: &HdbscanOptions,
) -> Result<HdbscanResult<R>>
where
    R: Runtime<DType = DType>,
    C: DistanceOps<R>
        + ReduceOps<R>
        + ScalarOps<R>
        + TensorOps<R>
        + CompareOps<R>
        + ConditionalOps<R>
        + ShapeOps<R>
        + IndexingOps<R>
        + UnaryOps<R>
        + UtilityOps<R>
        + TypeConversionOps<R>
        + SortingOps<R>
        + RuntimeClient<R>,
{
    validate_cluster_dtype(data.dtype(), "hdbscan")?;
    validate_data_2d(data.shape(), "hdbscan")?;
    validate_min_cluster_size(options.min_cluster_size, "hdbscan")?;
    if let Some(min_samples) = options.min_samples {
        validate_min_samples(min_samples, "hdbscan")?;
    }

    let n = data.shape()[0];
    let device = data.device();

    if n < 2 || n < options.min_cluster_size {
        return Ok(HdbscanResult {
            labels: vec![-1; n],
            probabilities: Tensor::<R>::from_slice(&vec![0.0f64; n], &[n], device),
            cluster_persistence: Vec::new(),
        });
    }

    // A point is its own 0-th neighbour, so min_samples indexes the
    // min_samples-th other point once the rows are sorted.
    let min_samples = options
        .min_samples
        .unwrap_or(options.min_cluster_size)
        .clamp(1, n - 1);

    // 1. Distance matrix [n, n]
    let dists = client.cdist(data, data, options.metric)?;

    // 2. Core distances [n]
    let sorted = client.sort(&dists, 1, false)?;
    let core_distances = sorted
        .narrow(1, min_samples, 1)?
        .contiguous()
        .reshape(&[n])?;

    // 3. Mutual reachability: max(core[i], core[j], dist[i, j])
    let core_row = core_distances.unsqueeze(1)?.broadcast_to(&[n, n])?;
    let core_col = core_distances.unsqueeze(0)?.broadcast_to(&[n, n])?;
    let mr_dist = client.maximum(&dists, &core_row)?;
    let mr_dist = client.maximum(&mr_dist, &core_col)?;
    let mr_host: Vec<f64> = client.cast(&mr_dist.contiguous(), DType::F64)?.to_vec();

    // 4. Hierarchy and cluster extraction on host (O(n) edges)
    let mst = prim_mst(n, &mr_host);
    let hierarchy = single_linkage(n, mst);
    let condensed = condense_tree(n, &hierarchy, options.min_cluster_size);
    let extraction = extract_clusters(
        n,
        &condensed,
        options.cluster_selection_method,
        options.allow_single_cluster,
    );

    let probabilities = Tensor::<R>::from_slice(&extraction.probabilities, &[n], device);

    Ok(HdbscanResult {
        labels: extraction.labels,
        probabilities,
        cluster_persistence: extraction.persistence,
    })
}

/// Merge step of the single-linkage dendrogram. Nodes `n..2n-1` are merges.
#[derive(Debug, Clone, Copy)]
struct LinkageNode {
    left: usize,
    right: usize,
    distance: f64,
    size: usize,
}

/// Edge of the condensed tree. Children `< n` are points, `>= n` clusters.
#[derive(Debug, Clone, Copy, PartialEq)]
struct CondensedEdge {
    parent: usize,
    child: usize,
    lambda: f64,
    child_size: usize,
}

struct Extraction {
    labels: Vec<i64>,
    probabilities: Vec<f64>,
    persistence: Vec<f64>,
}

fn lambda_of(distance: f64) -> f64 {
    if distance > 0.0 {
        1.0 / distance
    } else {
        f64::MAX
    }
}

/// Prim's algorithm over a dense row-major distance matrix.
fn prim_mst(n: usize, dist: &[f64]) -> Vec<(usize, usize, f64)> {
    let mut in_tree = vec![false; n];
    let mut min_cost = vec![f64::INFINITY; n];
    let mut parent = vec![0usize; n];
    let mut edges = Vec::with_capacity(n.saturating_sub(1));

    let mut current = 0;
    in_tree[0] = true;

    for _ in 1..n {
        let row = &dist[current * n..(current + 1) * n];
        let mut next = None;
        let mut best = f64::INFINITY;
        for j in 0..n {
            if in_tree[j] {
                continue;
            }
            if row[j] < min_cost[j] {
                min_cost[j] = row[j];
                parent[j] = current;
            }
            if next.is_none() || min_cost[j] < best {
                best = min_cost[j];
                next = Some(j);
            }
        }

        let Some(next) = next else { break };
        edges.push((parent[next], next, min_cost[next]));
        in_tree[next] = true;
        current = next;
    }

    edges
}

fn find(uf: &mut [usize], x: usize) -> usize {
    let mut root = x;
    while uf[root] != root {
        root = uf[root];
    }
    let mut cur = x;
    while uf[cur] != root {
        let next = uf[cur];
        uf[cur] = root;
        cur = next;
    }
    root
}

/// Build the single-linkage merge list from MST edges.
fn single_linkage(n: usize, mut edges: Vec<(usize, usize, f64)>) -> Vec<LinkageNode> {
    edges.sort_by(|a, b| a.2.total_cmp(&b.2));

    let mut uf: Vec<usize> = (0..2 * n).collect();
    let mut size = vec![1usize; 2 * n];
    let mut next = n;
    let mut nodes = Vec::with_capacity(edges.len());

    for (a, b, w) in edges {
        let ra = find(&mut uf, a);
        let rb = find(&mut uf, b);
        if ra == rb {
            continue;
        }
        let merged = size[ra] + size[rb];
        nodes.push(LinkageNode {
            left: ra,
            right: rb,
            distance: w,
            size: merged,
        });
        uf[ra] = next;
        uf[rb] = next;
        size[next] = merged;
        next += 1;
    }

    nodes
}

/// All nodes under `start` (inclusive), breadth first.
fn descendants(n: usize, hierarchy: &[LinkageNode], start: usize) -> Vec<usize> {
    let mut out = vec![start];
    let mut i = 0;
    while i < out.len() {
        let node = out[i];
        if node >= n {
            let merge = hierarchy[node - n];
            out.push(merge.left);
            out.push(merge.right);
        }
        i += 1;
    }
    out
}

/// Collapse the dendrogram: splits where both sides reach `min_cluster_size`
/// spawn new clusters, anything smaller falls out as points.
fn condense_tree(n: usize, hierarchy: &[LinkageNode], min_cluster_size: usize) -> Vec<CondensedEdge> {
    let total = n + hierarchy.len();
    let root = total - 1;
    let size_of = |node: usize| {
        if node < n {
            1
        } else {
            hierarchy[node - n].size
        }
    };

    let mut relabel = vec![0usize; total];
    relabel[root] = n;
    let mut next_label = n + 1;
    let mut ignore = vec![false; total];
    let mut condensed = Vec::with_capacity(n * 2);

    for node in descendants(n, hierarchy, root) {
        if node < n || ignore[node] {
            continue;
        }
        let merge = hierarchy[node - n];
        let lambda = lambda_of(merge.distance);
        let parent = relabel[node];
        let left_big = size_of(merge.left) >= min_cluster_size;
        let right_big = size_of(merge.right) >= min_cluster_size;

        let mut fall_out = |child: usize, condensed: &mut Vec<CondensedEdge>| {
            for sub in descendants(n, hierarchy, child) {
                if sub < n {
                    condensed.push(CondensedEdge {
                        parent,
                        child: sub,
                        lambda,
                        child_size: 1,
                    });
                }
                ignore[sub] = true;
            }
        };

        match (left_big, right_big) {
            (true, true) => {
                for child in [merge.left, merge.right] {
                    relabel[child] = next_label;
                    condensed.push(CondensedEdge {
                        parent,
                        child: next_label,
                        lambda,
                        child_size: size_of(child),
                    });
                    next_label += 1;
                }
            }
            (false, false) => {
                fall_out(merge.left, &mut condensed);
                fall_out(merge.right, &mut condensed);
            }
            (true, false) => {
                relabel[merge.left] = parent;
                fall_out(merge.right, &mut condensed);
            }
            (false, true) => {
                relabel[merge.right] = parent;
                fall_out(merge.left, &mut condensed);
            }
        }
    }

    condensed
}

/// Select clusters from the condensed tree and label every point.
fn extract_clusters(
    n: usize,
    condensed: &[CondensedEdge],
    method: ClusterSelectionMethod,
    allow_single_cluster: bool,
) -> Extraction {
    let n_nodes = condensed
        .iter()
        .map(|e| e.parent.max(if e.child >= n { e.child } else { n }))
        .max()
        .map_or(1, |max_label| max_label - n + 1);

    // Indices below are cluster label - n; the root is 0.
    let mut birth = vec![0.0f64; n_nodes];
    let mut cluster_parent = vec![0usize; n_nodes];
    let mut cluster_children: Vec<Vec<usize>> = vec![Vec::new(); n_nodes];
    let mut point_parent = vec![0usize; n];
    let mut point_lambda = vec![0.0f64; n];

    for e in condensed {
        if e.child >= n {
            let c = e.child - n;
            birth[c] = e.lambda;
            cluster_parent[c] = e.parent - n;
            cluster_children[e.parent - n].push(c);
        } else {
            point_parent[e.child] = e.parent - n;
            point_lambda[e.child] = e.lambda;
        }
    }

    let mut stability = vec![0.0f64; n_nodes];
    for e in condensed {
        let p = e.parent - n;
        stability[p] += (e.lambda - birth[p]) * e.child_size as f64;
    }
    let own_stability = stability.clone();

    let mut selected = vec![false; n_nodes];
    match method {
        ClusterSelectionMethod::EOM => {
            let first = if allow_single_cluster { 0 } else { 1 };
            let mut is_cluster = vec![true; n_nodes];
            // Children always carry larger labels than their parent.
            for c in (first..n_nodes).rev() {
                let subtree: f64 = cluster_children[c].iter().map(|&ch| stability[ch]).sum();
                if subtree > stability[c] {
                    is_cluster[c] = false;
                    stability[c] = subtree;
                } else {
                    let mut stack = cluster_children[c].clone();
                    while let Some(d) = stack.pop() {
                        is_cluster[d] = false;
                        stack.extend_from_slice(&cluster_children[d]);
                    }
                }
            }
            for c in first..n_nodes {
                selected[c] = is_cluster[c];
            }
        }
        ClusterSelectionMethod::Leaf => {
            for c in 1..n_nodes {
                selected[c] = cluster_children[c].is_empty();
            }
            if allow_single_cluster && n_nodes == 1 {
                selected[0] = true;
            }
        }
    }

    let mut label_of = vec![-1i64; n_nodes];
    let mut persistence = Vec::new();
    for c in 0..n_nodes {
        if selected[c] {
            label_of[c] = persistence.len() as i64;
            persistence.push(own_stability[c]);
        }
    }

    // Root selected alone: only points that persist to the deepest root
    // lambda are members.
    let root_threshold = if selected[0] {
        condensed
            .iter()
            .filter(|e| e.parent == n)
            .map(|e| e.lambda)
            .fold(0.0f64, f64::max)
    } else {
        0.0
    };

    let mut labels = vec![-1i64; n];
    for p in 0..n {
        let mut c = point_parent[p];
        loop {
            if selected[c] {
                if c != 0 || point_lambda[p] >= root_threshold {
                    labels[p] = label_of[c];
                }
                break;
            }
            if c == 0 {
                break;
            }
            c = cluster_parent[c];
        }
    }

    let mut max_lambda = vec![0.0f64; persistence.len()];
    for p in 0..n {
        if labels[p] >= 0 {
            let l = labels[p] as usize;
            max_lambda[l] = max_lambda[l].max(point_lambda[p]);
        }
    }
    let probabilities = (0..n)
        .map(|p| {
            if labels[p] < 0 {
                return 0.0;
            }
            let max_l = max_lambda[labels[p] as usize];
            if max_l <= 0.0 {
                1.0
            } else {
                point_lambda[p].min(max_l) / max_l
            }
        })
        .collect();

    Extraction {
        labels,
        probabilities,
        persistence,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dense(points: &[(f64, f64)]) -> Vec<f64> {
        let n = points.len();
        let mut out = vec![0.0; n * n];
        for i in 0..n {
            for j in 0..n {
                let dx = points[i].0 - points[j].0;
                let dy = points[i].1 - points[j].1;
                out[i * n + j] = (dx * dx + dy * dy).sqrt();
            }
        }
        out
    }

    #[test]
    fn test_prim_mst_spans_all_points() {
        let pts = [(0.0, 0.0), (1.0, 0.0), (5.0, 0.0), (6.0, 0.0)];
        let mst = prim_mst(4, &dense(&pts));
        assert_eq!(mst.len(), 3);
        let total: f64 = mst.iter().map(|e| e.2).sum();
        assert!((total - 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_single_linkage_root_holds_everything() {
        let pts = [(0.0, 0.0), (1.0, 0.0), (5.0, 0.0), (6.0, 0.0)];
        let hierarchy = single_linkage(4, prim_mst(4, &dense(&pts)));
        assert_eq!(hierarchy.len(), 3);
        let root = hierarchy.last().unwrap();
        assert_eq!(root.size, 4);
        assert!((root.distance - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_condensed_tree_every_point_falls_out_once() {
        let pts = [
            (0.0, 0.0),
            (0.1, 0.0),
            (0.0, 0.1),
            (10.0, 10.0),
            (10.1, 10.0),
            (10.0, 10.1),
        ];
        let hierarchy = single_linkage(6, prim_mst(6, &dense(&pts)));
        let condensed = condense_tree(6, &hierarchy, 3);

        let mut seen = vec![0; 6];
        for e in &condensed {
            if e.child < 6 {
                seen[e.child] += 1;
            }
        }
        assert!(seen.iter().all(|&c| c == 1));

        // Root (label 6) splits into two clusters of three.
        let splits: Vec<_> = condensed.iter().filter(|e| e.child >= 6).collect();
        assert_eq!(splits.len(), 2);
        assert!(splits.iter().all(|e| e.parent == 6 && e.child_size == 3));
    }

    #[test]
    fn test_extract_without_clusters_is_all_noise() {
        let pts = [(0.0, 0.0), (0.1, 0.0), (10.0, 10.0), (10.1, 10.0)];
        let hierarchy = single_linkage(4, prim_mst(4, &dense(&pts)));
        let condensed = condense_tree(4, &hierarchy, 3);
        let out = extract_clusters(4, &condensed, ClusterSelectionMethod::EOM, false);
        assert_eq!(out.labels, vec![-1; 4]);
        assert!(out.persistence.is_empty());
    }
}
