use crate::detect::rect::Rect;

/// True when every edge of `a` is within `eps`-relative distance of the
/// corresponding edge of `b`.
fn similar(a: &Rect, b: &Rect, eps: f64) -> bool {
    let delta = eps * (a.width.min(b.width) + a.height.min(b.height)) as f64 * 0.5;
    (a.x - b.x).abs() as f64 <= delta
        && (a.y - b.y).abs() as f64 <= delta
        && (a.right() - b.right()).abs() as f64 <= delta
        && (a.bottom() - b.bottom()).abs() as f64 <= delta
}

fn find(parent: &mut [usize], mut i: usize) -> usize {
    while parent[i] != i {
        parent[i] = parent[parent[i]];
        i = parent[i];
    }
    i
}

/// Partitions rectangles into similarity classes.  Class labels follow the
/// order in which each class's first member appears in `rects`.
fn partition(rects: &[Rect], eps: f64) -> (Vec<usize>, usize) {
    let n = rects.len();
    let mut parent: Vec<usize> = (0..n).collect();
    for i in 0..n {
        for j in (i + 1)..n {
            if similar(&rects[i], &rects[j], eps) {
                let ri = find(&mut parent, i);
                let rj = find(&mut parent, j);
                if ri != rj {
                    parent[rj.max(ri)] = rj.min(ri);
                }
            }
        }
    }

    let mut class_of_root = vec![usize::MAX; n];
    let mut labels = vec![0; n];
    let mut classes = 0;
    for i in 0..n {
        let root = find(&mut parent, i);
        if class_of_root[root] == usize::MAX {
            class_of_root[root] = classes;
            classes += 1;
        }
        labels[i] = class_of_root[root];
    }
    (labels, classes)
}

/// Merges raw window hits into detections.
///
/// Similar rectangles are clustered and averaged; clusters with
/// `min_neighbors` or fewer members are dropped, as are clusters nested
/// inside a stronger neighbouring cluster.  With `min_neighbors == 0` the
/// hits are returned unchanged.
pub fn group_rectangles(rects: Vec<Rect>, min_neighbors: usize, eps: f64) -> Vec<Rect> {
    if min_neighbors == 0 || rects.is_empty() {
        return rects;
    }

    let (labels, classes) = partition(&rects, eps);
    let mut sums = vec![(0i64, 0i64, 0i64, 0i64); classes];
    let mut weights = vec![0usize; classes];
    for (r, &cls) in rects.iter().zip(labels.iter()) {
        let s = &mut sums[cls];
        s.0 += r.x as i64;
        s.1 += r.y as i64;
        s.2 += r.width as i64;
        s.3 += r.height as i64;
        weights[cls] += 1;
    }

    let averaged: Vec<Rect> = sums
        .iter()
        .zip(weights.iter())
        .map(|(s, &n)| {
            let k = 1.0 / n as f64;
            Rect::new(
                (s.0 as f64 * k).round() as i32,
                (s.1 as f64 * k).round() as i32,
                (s.2 as f64 * k).round() as i32,
                (s.3 as f64 * k).round() as i32,
            )
        })
        .collect();

    let mut out = Vec::new();
    for i in 0..classes {
        let (r1, n1) = (averaged[i], weights[i]);
        if n1 <= min_neighbors {
            continue;
        }
        let nested = (0..classes).any(|j| {
            let n2 = weights[j];
            if j == i || n2 <= min_neighbors {
                return false;
            }
            let r2 = averaged[j];
            let dx = (r2.width as f64 * eps).round() as i32;
            let dy = (r2.height as f64 * eps).round() as i32;
            r1.x >= r2.x - dx
                && r1.y >= r2.y - dy
                && r1.right() <= r2.right() + dx
                && r1.bottom() <= r2.bottom() + dy
                && (n2 > n1.max(3) || n1 < 3)
        });
        if !nested {
            out.push(r1);
        }
    }
    out
}
