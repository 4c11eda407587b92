use super::*;
use crate::foundation::core::Vec3;

fn translate(x: f32, y: f32) -> Mat4 {
    Mat4::from_translation(Vec3::new(x, y, 0.0))
}

#[test]
fn matched_push_pop_restores_top() {
    let mut s = TransformStack::new(8);
    s.reset(Mat4::IDENTITY, translate(1.0, 1.0));
    let before = s.top();

    s.push();
    s.multiply_matrix(translate(3.0, 0.0));
    s.push();
    s.multiply_matrix(Mat4::from_scale(Vec3::splat(2.0)));
    s.pop();
    s.push();
    s.multiply_matrix(translate(0.0, 9.0));
    s.pop();
    s.pop();

    assert_eq!(s.top(), before);
    assert_eq!(s.depth(), 1);
}

#[test]
fn push_duplicates_and_multiply_post_multiplies() {
    let mut s = TransformStack::new(4);
    s.reset(Mat4::IDENTITY, translate(1.0, 0.0));
    s.push();
    assert_eq!(s.top(), translate(1.0, 0.0));
    s.multiply_matrix(Mat4::from_scale(Vec3::splat(2.0)));
    // view * scale: scale first, then translate.
    let p = s.top().transform_point3(Vec3::new(1.0, 0.0, 0.0));
    assert_eq!(p, Vec3::new(3.0, 0.0, 0.0));
}

#[test]
fn mvp_is_projection_times_top() {
    let proj = Mat4::from_scale(Vec3::new(0.5, 0.5, 1.0));
    let mut s = TransformStack::new(4);
    s.reset(proj, translate(2.0, 2.0));
    s.push();
    s.multiply_matrix(translate(2.0, 0.0));
    assert_eq!(s.mvp(), proj * translate(2.0, 2.0) * translate(2.0, 0.0));
    assert_eq!(s.projection(), proj);
}

#[test]
fn reset_returns_to_depth_one() {
    let mut s = TransformStack::new(4);
    s.push();
    s.push();
    s.reset(Mat4::IDENTITY, Mat4::IDENTITY);
    assert_eq!(s.depth(), 1);
    assert_eq!(s.max_depth(), 4);
}

#[test]
#[should_panic(expected = "underflow")]
fn pop_at_base_panics() {
    let mut s = TransformStack::new(4);
    s.pop();
}

#[test]
#[should_panic(expected = "overflow")]
fn push_past_max_depth_panics() {
    let mut s = TransformStack::new(2);
    s.push();
    s.push();
}
